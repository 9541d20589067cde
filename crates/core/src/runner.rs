//! Batch runner.
//!
//! Drives the run strictly sequentially:
//! - Lookup: resolve `kid` for the account (optional, failures tolerated)
//! - Redeem: try the variant list until one is accepted
//! - Pace: fixed sleep before the next account
//!
//! The summary is logged once at the end and optionally posted to a webhook.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::SecondsFormat;
use tracing::info;

use crate::client::SignedClient;
use crate::clock::Clock;
use crate::config::Config;
use crate::notify::WebhookNotifier;
use crate::player::PlayerLookup;
use crate::redeem::{RedeemResult, Redeemer};
use crate::sign::Signer;
use crate::transport::Transport;

/// Outcome line for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    pub fid: String,
    /// `None` on success, the failure reason otherwise.
    pub failure: Option<String>,
}

impl fmt::Display for RowResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            None => write!(f, "{}: OK", self.fid),
            Some(reason) => write!(f, "{}: FAIL - {}", self.fid, reason),
        }
    }
}

/// Aggregate counters plus one detail line per account, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ok: usize,
    pub fail: usize,
    pub rows: Vec<RowResult>,
}

impl RunSummary {
    pub fn record(&mut self, fid: &str, result: &RedeemResult) {
        let failure = match result {
            RedeemResult::Ok(_) => {
                self.ok += 1;
                None
            }
            RedeemResult::Fail { reason } => {
                self.fail += 1;
                Some(reason.clone())
            }
        };
        self.rows.push(RowResult {
            fid: fid.to_string(),
            failure,
        });
    }

    /// Detail lines as rendered in the summary.
    pub fn detail_lines(&self) -> Vec<String> {
        self.rows.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Daily gift run finished. OK={} FAIL={}", self.ok, self.fail)?;
        for row in &self.rows {
            write!(f, "\n{}", row)?;
        }
        Ok(())
    }
}

/// Runs one gift code over a list of accounts.
pub struct Runner {
    lookup: PlayerLookup,
    redeemer: Redeemer,
    notifier: Option<WebhookNotifier>,
    clock: Arc<dyn Clock>,
    cdk: String,
    pacing: Duration,
}

impl Runner {
    pub fn new(
        lookup: PlayerLookup,
        redeemer: Redeemer,
        clock: Arc<dyn Clock>,
        cdk: impl Into<String>,
        pacing: Duration,
    ) -> Self {
        Self {
            lookup,
            redeemer,
            notifier: None,
            clock,
            cdk: cdk.into(),
            pacing,
        }
    }

    /// Wire every component from a validated config.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        let client = SignedClient::new(
            Arc::clone(&transport),
            Signer::new(config.secret.clone()),
            Arc::clone(&clock),
            config.api_timeout(),
        );
        let lookup = PlayerLookup::new(client.clone(), &config.player_endpoint, config.time_unit);
        let redeemer = Redeemer::new(
            client,
            &config.gift_endpoint,
            config.time_unit,
            config.include_kid,
        );

        let runner = Self::new(lookup, redeemer, clock, &config.current_code, config.pacing());
        match &config.discord_webhook {
            Some(url) => runner.with_notifier(WebhookNotifier::new(
                transport,
                url,
                config.notify_timeout(),
            )),
            None => runner,
        }
    }

    pub fn with_notifier(mut self, notifier: WebhookNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Opening log line of a run over `count` accounts.
    pub fn banner(&self, count: usize) -> String {
        format!(
            "=== Daily run start @ {}; IDs={}; code={} ===",
            self.clock.now().to_rfc3339_opts(SecondsFormat::Micros, true),
            count,
            self.cdk
        )
    }

    /// Process every account, then report.
    pub async fn run(&self, fids: &[String]) -> RunSummary {
        info!("{}", self.banner(fids.len()));

        let mut summary = RunSummary::default();
        for (i, fid) in fids.iter().enumerate() {
            info!(row = i + 1, fid = %fid, "Row {} BEGIN (fid={})", i + 1, fid);

            let kid = self.lookup.fetch(fid).await.and_then(|p| p.kid());
            let result = self.redeemer.redeem(fid, &self.cdk, kid.as_deref()).await;
            info!(fid = %fid, status = result.status(), "Row {} done", i + 1);
            summary.record(fid, &result);

            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        let text = summary.to_string();
        info!("{}", text);
        if let Some(ref notifier) = self.notifier {
            notifier.notify(&text).await;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::redeem::EXHAUSTED_REASON;
    use crate::response::ApiResponse;
    use crate::testing::{fixtures, MockTransport};
    use crate::transport::RequestBody;

    fn runner(transport: &MockTransport, config: &Config) -> Runner {
        Runner::from_config(
            config,
            Arc::new(transport.clone()),
            Arc::new(FixedClock::from_millis(1_000_000)),
        )
    }

    #[test]
    fn test_banner_uses_clock() {
        let transport = MockTransport::new();
        let config = fixtures::config("1,2,3");
        let runner = runner(&transport, &config);
        assert_eq!(
            runner.banner(3),
            "=== Daily run start @ 1970-01-01T00:16:40.000000Z; IDs=3; code=ABC ==="
        );
    }

    #[tokio::test]
    async fn test_pacing_between_accounts() {
        let transport = MockTransport::new();
        transport
            .set_handler(|req| {
                if req.url == fixtures::GIFT_URL {
                    fixtures::api_reply(0, "SUCCESS")
                } else {
                    fixtures::player_not_found()
                }
            })
            .await;

        let config = Config {
            pacing_ms: 50,
            ..fixtures::config("1,2")
        };
        runner(&transport, &config).run(&config.fids()).await;

        let recorded = transport.recorded_requests().await;
        let second_lookup = recorded
            .iter()
            .filter(|r| r.request.url == fixtures::PLAYER_URL)
            .nth(1)
            .unwrap();
        let first_gift = recorded
            .iter()
            .find(|r| r.request.url == fixtures::GIFT_URL)
            .unwrap();
        assert!(
            second_lookup.timestamp.duration_since(first_gift.timestamp)
                >= Duration::from_millis(50)
        );
    }

    #[test]
    fn test_summary_rendering() {
        let mut summary = RunSummary::default();
        summary.record("1", &RedeemResult::Ok(ApiResponse::default()));
        summary.record(
            "2",
            &RedeemResult::Fail {
                reason: "nope".to_string(),
            },
        );
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.fail, 1);
        assert_eq!(
            summary.to_string(),
            "Daily gift run finished. OK=1 FAIL=1\n1: OK\n2: FAIL - nope"
        );
    }

    #[tokio::test]
    async fn test_run_all_ok() {
        let transport = MockTransport::new();
        transport
            .set_handler(|req| {
                if req.url == fixtures::GIFT_URL {
                    fixtures::api_reply(0, "")
                } else {
                    fixtures::player_not_found()
                }
            })
            .await;

        let config = fixtures::config("1,2");
        let summary = runner(&transport, &config).run(&config.fids()).await;

        assert_eq!(summary.ok, 2);
        assert_eq!(summary.fail, 0);
        assert_eq!(summary.detail_lines(), vec!["1: OK", "2: OK"]);
        assert!(summary.to_string().contains("OK=2 FAIL=0"));
        assert_eq!(transport.requests_to(fixtures::PLAYER_URL).await.len(), 2);
        assert_eq!(transport.requests_to(fixtures::GIFT_URL).await.len(), 2);
    }

    #[tokio::test]
    async fn test_run_sign_error_fails_row() {
        let transport = MockTransport::new();
        transport
            .set_handler(|_| fixtures::api_reply(1, "sign error"))
            .await;

        let config = fixtures::config("1");
        let summary = runner(&transport, &config).run(&config.fids()).await;

        assert_eq!((summary.ok, summary.fail), (0, 1));
        assert_eq!(
            summary.detail_lines(),
            vec![format!("1: FAIL - {}", EXHAUSTED_REASON)]
        );
    }

    #[tokio::test]
    async fn test_kid_from_lookup_reaches_redeemer() {
        let transport = MockTransport::new();
        transport
            .push_reply(fixtures::PLAYER_URL, fixtures::player_found("5", 311))
            .await;
        transport
            .push_reply(fixtures::GIFT_URL, fixtures::api_reply(1, "params error"))
            .await;
        transport
            .push_reply(fixtures::GIFT_URL, fixtures::api_reply(0, "SUCCESS"))
            .await;

        let config = Config {
            include_kid: true,
            ..fixtures::config("5")
        };
        let summary = runner(&transport, &config).run(&config.fids()).await;

        assert_eq!(summary.ok, 1);
        let gift = transport.requests_to(fixtures::GIFT_URL).await;
        assert_eq!(gift.len(), 2);
        assert_eq!(gift[0].form_field("kid"), None);
        assert_eq!(gift[1].form_field("kid"), Some("311"));
    }

    #[tokio::test]
    async fn test_webhook_receives_summary() {
        let transport = MockTransport::new();
        transport
            .set_handler(|req| {
                if req.url == fixtures::GIFT_URL {
                    fixtures::api_reply(0, "SUCCESS")
                } else {
                    fixtures::player_not_found()
                }
            })
            .await;

        let config = Config {
            discord_webhook: Some(fixtures::WEBHOOK_URL.to_string()),
            ..fixtures::config("9")
        };
        runner(&transport, &config).run(&config.fids()).await;

        let hooks = transport.requests_to(fixtures::WEBHOOK_URL).await;
        assert_eq!(hooks.len(), 1);
        match &hooks[0].body {
            RequestBody::Json(body) => assert_eq!(
                body["content"],
                "Daily gift run finished. OK=1 FAIL=0\n9: OK"
            ),
            other => panic!("expected JSON body, got {:?}", other),
        }
        assert_eq!(hooks[0].timeout, config.notify_timeout());
    }

    #[tokio::test]
    async fn test_rows_processed_in_order() {
        let transport = MockTransport::new();
        let config = fixtures::config("30, 10 ,20");
        let summary = runner(&transport, &config).run(&config.fids()).await;

        let fids: Vec<_> = summary.rows.iter().map(|r| r.fid.as_str()).collect();
        assert_eq!(fids, vec!["30", "10", "20"]);
        let lookups: Vec<_> = transport
            .requests_to(fixtures::PLAYER_URL)
            .await
            .iter()
            .map(|r| r.form_field("fid").unwrap().to_string())
            .collect();
        assert_eq!(lookups, vec!["30", "10", "20"]);
    }
}
