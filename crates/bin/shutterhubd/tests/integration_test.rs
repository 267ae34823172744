//! End-to-end tests for the full shutterhubd stack.
//!
//! Each test wires the real OpenWeatherMap and shutter controller adapters
//! into the real application services, pointed at local mockito servers.
//! The clock is fixed so event selection is deterministic.

use std::time::Duration;

use chrono::{TimeDelta, TimeZone, Utc};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use shutterhub_adapter_openweather::{OpenWeatherConfig, OpenWeatherProvider};
use shutterhub_adapter_shutter_http::{HttpShutterDevice, ShutterHttpConfig};
use shutterhub_app::ports::Clock;
use shutterhub_app::services::actuation_service::{
    ActuationOutcome, ActuationService, RetryPolicy,
};
use shutterhub_app::services::forecast_adjuster::ForecastAdjuster;
use shutterhub_app::services::trigger_scheduler::{CycleEnd, TriggerScheduler};
use shutterhub_app::shutdown::Shutdown;
use shutterhub_domain::direction::Direction;
use shutterhub_domain::forecast::CloudAdjustmentConfig;
use shutterhub_domain::location::Location;
use shutterhub_domain::offset::OffsetConfig;
use shutterhub_domain::solar::{DayEvents, SolarEventCalculator};
use shutterhub_domain::time::Timestamp;

struct FixedClock(Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

type Scheduler = TriggerScheduler<OpenWeatherProvider, HttpShutterDevice, FixedClock>;

fn berlin() -> Location {
    Location::new(52.52, 13.40).unwrap()
}

fn calculator() -> SolarEventCalculator {
    SolarEventCalculator::new(berlin(), OffsetConfig::default())
}

fn raw_events() -> DayEvents {
    calculator()
        .compute_raw_events(chrono::NaiveDate::from_ymd_opt(2024, 4, 15).unwrap())
        .unwrap()
}

/// Build the stack against the given servers with a clock fixed at `now`.
fn scheduler(weather: &ServerGuard, shutters: &ServerGuard, now: Timestamp) -> Scheduler {
    let provider = OpenWeatherProvider::new(
        OpenWeatherConfig::new("owm-key")
            .with_base_url(weather.url())
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();
    let device = HttpShutterDevice::new(
        ShutterHttpConfig::new(shutters.url(), "admin", "secret")
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    TriggerScheduler::new(
        calculator(),
        ForecastAdjuster::new(provider, berlin(), CloudAdjustmentConfig::default()),
        ActuationService::new(
            device,
            RetryPolicy {
                max_retries: 2,
                retry_delay: Duration::from_millis(20),
            },
        ),
        FixedClock(now),
        Duration::from_millis(10),
    )
}

/// Hourly samples with the same cloud percentage all day.
fn uniform_forecast(clouds: u32) -> String {
    let start = Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap().timestamp();
    let hourly: Vec<_> = (0..48)
        .map(|h| json!({ "dt": start + h * 3600, "clouds": clouds }))
        .collect();
    json!({ "current": { "dt": start, "clouds": clouds }, "hourly": hourly }).to_string()
}

async fn mock_forecast(server: &mut ServerGuard, body: String, hits: usize) -> mockito::Mock {
    server
        .mock("GET", "/data/3.0/onecall")
        .match_query(Matcher::UrlEncoded("appid".into(), "owm-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

// ---------------------------------------------------------------------------
// Event selection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_delay_opening_under_overcast_sky() {
    let mut weather = Server::new_async().await;
    let shutters = Server::new_async().await;
    let forecast = mock_forecast(&mut weather, uniform_forecast(100), 2).await;
    let now = raw_events().open - TimeDelta::hours(3);

    let trigger = scheduler(&weather, &shutters, now).compute(now).await.unwrap();

    assert_eq!(trigger.event.direction, Direction::Open);
    assert_eq!(trigger.event.at, raw_events().open + TimeDelta::hours(2));
    // one fetch for the open adjustment, one for the close adjustment
    forecast.assert_async().await;
}

#[tokio::test]
async fn should_advance_closing_under_overcast_sky() {
    let mut weather = Server::new_async().await;
    let shutters = Server::new_async().await;
    let _forecast = mock_forecast(&mut weather, uniform_forecast(100), 2).await;
    let now = raw_events().open + TimeDelta::hours(3);

    let trigger = scheduler(&weather, &shutters, now).compute(now).await.unwrap();

    assert_eq!(trigger.event.direction, Direction::Close);
    assert_eq!(trigger.event.at, raw_events().close - TimeDelta::hours(2));
}

#[tokio::test]
async fn should_fall_back_to_raw_times_when_forecast_fails() {
    let mut weather = Server::new_async().await;
    let shutters = Server::new_async().await;
    let _failing = weather
        .mock("GET", "/data/3.0/onecall")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let now = raw_events().open - TimeDelta::hours(3);

    let trigger = scheduler(&weather, &shutters, now).compute(now).await.unwrap();

    assert_eq!(trigger.event.at, raw_events().open);
}

// ---------------------------------------------------------------------------
// Full cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_give_up_after_three_busy_replies() {
    let mut weather = Server::new_async().await;
    let mut shutters = Server::new_async().await;
    let _forecast = mock_forecast(&mut weather, uniform_forecast(0), 2).await;
    let challenged = shutters
        .mock("GET", "/right")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header(
            "www-authenticate",
            r#"Digest realm="Login Required", qop="auth", nonce="51d0e2", opaque="c0ffee""#,
        )
        .expect(3)
        .create_async()
        .await;
    let busy = shutters
        .mock("GET", "/right")
        .match_header(
            "authorization",
            Matcher::AllOf(vec![
                Matcher::Regex("^Digest ".into()),
                Matcher::Regex(r#"username="admin""#.into()),
                Matcher::Regex(r#"uri="/right""#.into()),
            ]),
        )
        .with_status(200)
        .with_body("try again later")
        .expect(3)
        .create_async()
        .await;
    // clear sky: no shift, the open event is 50ms away
    let now = raw_events().open - TimeDelta::milliseconds(50);
    let sched = scheduler(&weather, &shutters, now);

    let first = sched.run_cycle(&Shutdown::never()).await.unwrap();

    challenged.assert_async().await;
    busy.assert_async().await;
    match first {
        CycleEnd::Fired { event, outcome } => {
            assert_eq!(event.direction, Direction::Open);
            assert!(matches!(outcome, ActuationOutcome::GivenUp { attempts: 3 }));
        }
        CycleEnd::Cancelled => panic!("cycle should have fired"),
    }
}

#[tokio::test]
async fn should_close_via_left_endpoint_at_adjusted_time() {
    let mut weather = Server::new_async().await;
    let mut shutters = Server::new_async().await;
    let _forecast = mock_forecast(&mut weather, uniform_forecast(0), 2).await;
    let close = shutters
        .mock("GET", "/left")
        .with_status(200)
        .with_body("success")
        .expect(1)
        .create_async()
        .await;
    let open = shutters.mock("GET", "/right").expect(0).create_async().await;
    let now = raw_events().close - TimeDelta::milliseconds(50);

    let end = scheduler(&weather, &shutters, now)
        .run_cycle(&Shutdown::never())
        .await
        .unwrap();

    assert!(matches!(
        end,
        CycleEnd::Fired {
            outcome: ActuationOutcome::Success { attempts: 1 },
            ..
        }
    ));
    close.assert_async().await;
    open.assert_async().await;
}

#[tokio::test]
async fn should_not_retry_rejected_credentials() {
    let mut weather = Server::new_async().await;
    let mut shutters = Server::new_async().await;
    let _forecast = mock_forecast(&mut weather, uniform_forecast(0), 2).await;
    let unauthorized = shutters
        .mock("GET", "/right")
        .with_status(401)
        .with_body("401 Unauthorized")
        .expect(1)
        .create_async()
        .await;
    let now = raw_events().open - TimeDelta::milliseconds(50);

    let end = scheduler(&weather, &shutters, now)
        .run_cycle(&Shutdown::never())
        .await
        .unwrap();

    assert!(matches!(
        end,
        CycleEnd::Fired {
            outcome: ActuationOutcome::Failed { attempts: 1, .. },
            ..
        }
    ));
    unauthorized.assert_async().await;
}
