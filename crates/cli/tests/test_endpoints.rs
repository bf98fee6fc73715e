#![allow(clippy::unwrap_used)]

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use zeeremind_cli::api::auth::{self, PasswordChange, RegisterOutcome, RegisterRequest};
use zeeremind_cli::api::payment::{self, BillingPeriod, CheckoutKind, Processor};
use zeeremind_cli::api::{invoices, subscription};
use zeeremind_cli::api::{ApiClient, MemoryTokenStore, RequestError, TokenStore};
use zeeremind_cli::snapshot::fetch_snapshot_with;
use zeeremind_cli::ClientConfig;
use zeeremind_core::{Feature, InvoiceStatus, Plan, ReminderKind};

fn client(server: &ServerGuard, tokens: Arc<MemoryTokenStore>) -> ApiClient {
    let config = ClientConfig {
        api_url: server.url(),
        retry_base_delay_ms: 1,
        ..ClientConfig::default()
    };
    ApiClient::new(config, tokens).unwrap()
}

// --- Auth ---

#[test]
fn login_stores_token() {
    let mut server = Server::new();
    server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(json!({"email": "ann@acme.test", "password": "hunter22"})))
        .with_body(r#"{"success":true,"token":"fresh"}"#)
        .create();

    let tokens = Arc::new(MemoryTokenStore::new());
    let api = client(&server, Arc::clone(&tokens));
    assert_eq!(auth::login(&api, "ann@acme.test", "hunter22").unwrap(), "fresh");
    assert_eq!(tokens.load().as_deref(), Some("fresh"));
}

#[test]
fn login_rejection_is_invalid_credentials() {
    let mut server = Server::new();
    server.mock("POST", "/auth/login").with_status(401).create();

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    let err = auth::login(&api, "ann@acme.test", "wrong").unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(!err.is_auth());
}

#[test]
fn failed_login_keeps_existing_session() {
    let mut server = Server::new();
    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"success":false,"error":"Account locked"}"#)
        .create();

    let tokens = Arc::new(MemoryTokenStore::with_token("good-session"));
    let api = client(&server, Arc::clone(&tokens));
    let err = auth::login(&api, "ann@acme.test", "wrong").unwrap_err();

    assert_eq!(err.to_string(), "Account locked");
    assert_eq!(tokens.load().as_deref(), Some("good-session"));
}

#[test]
fn register_without_token_awaits_verification() {
    let mut server = Server::new();
    server
        .mock("POST", "/auth/register")
        .match_body(Matcher::PartialJson(json!({"role": "user", "companyName": "Acme"})))
        .with_status(201)
        .with_body(r#"{"success":true,"message":"Check your inbox"}"#)
        .create();

    let tokens = Arc::new(MemoryTokenStore::new());
    let api = client(&server, Arc::clone(&tokens));
    let request = RegisterRequest::new("Ann", "Acme", "ann@acme.test", "hunter22");
    assert_eq!(
        auth::register(&api, &request).unwrap(),
        RegisterOutcome::VerificationSent("Check your inbox".to_string())
    );
    assert_eq!(tokens.load(), None);
}

#[test]
fn register_with_token_logs_in() {
    let mut server = Server::new();
    server
        .mock("POST", "/auth/register")
        .with_body(r#"{"success":true,"data":{"token":"new-session"}}"#)
        .create();

    let tokens = Arc::new(MemoryTokenStore::new());
    let api = client(&server, Arc::clone(&tokens));
    let request = RegisterRequest::new("Ann", "", "ann@acme.test", "hunter22");
    assert_eq!(auth::register(&api, &request).unwrap(), RegisterOutcome::LoggedIn);
    assert_eq!(tokens.load().as_deref(), Some("new-session"));
}

#[test]
fn verify_email_hits_token_path() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/auth/verify-email/abc123")
        .with_body(r#"{"success":true,"message":"Email verified successfully"}"#)
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    assert_eq!(
        auth::verify_email(&api, "abc123").unwrap(),
        "Email verified successfully"
    );
    mock.assert();
}

#[test]
fn verify_email_escapes_token() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/auth/verify-email/a%2Fb%3Fc")
        .with_body(r#"{"success":true,"message":"ok"}"#)
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    auth::verify_email(&api, "a/b?c").unwrap();
    mock.assert();
}

#[test]
fn me_decodes_user() {
    let mut server = Server::new();
    server
        .mock("GET", "/auth/me")
        .with_body(
            r#"{"success":true,"data":{"_id":"u1","name":"Ann","email":"ann@acme.test","companyName":"Acme","isEmailVerified":true}}"#,
        )
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let user = auth::me(&api).unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.company_name.as_deref(), Some("Acme"));
    assert!(user.is_email_verified);
}

#[test]
fn password_change_is_validated_locally() {
    let mut server = Server::new();
    let mock = server.mock("PUT", Matcher::Any).expect(0).create();
    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));

    let short = PasswordChange {
        current: "old-pass".to_string(),
        new: "short".to_string(),
        confirm: "short".to_string(),
    };
    let mismatch = PasswordChange {
        current: "old-pass".to_string(),
        new: "long-enough".to_string(),
        confirm: "long-enougH".to_string(),
    };
    assert!(matches!(
        auth::update_password(&api, &short),
        Err(RequestError::Invalid(_))
    ));
    assert_eq!(
        auth::update_password(&api, &mismatch).unwrap_err().to_string(),
        "Passwords don't match"
    );
    mock.assert();
}

#[test]
fn logout_clears_token() {
    let server = Server::new();
    let tokens = Arc::new(MemoryTokenStore::with_token("t"));
    let api = client(&server, Arc::clone(&tokens));
    auth::logout(&api).unwrap();
    assert_eq!(tokens.load(), None);
}

// --- Subscription ---

#[test]
fn plans_are_fetched_without_token() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/subscription/plans")
        .match_header("authorization", Matcher::Missing)
        .with_body(
            r#"{"success":true,"data":[
                {"id":"free","name":"Free","price":0,"interval":"month","features":{"maxInvoices":3}},
                {"id":"pro","name":"Pro","price":9,"interval":"month","features":{"maxInvoices":-1,"smsReminders":true}}
            ]}"#,
        )
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let plans = subscription::plans(&api).unwrap();

    mock.assert();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].features.max_invoices(), Some(3));
    assert_eq!(plans[1].features.max_invoices(), None);
}

#[test]
fn snapshot_uses_explicit_token() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/subscription/status")
        .match_header("authorization", "Bearer explicit")
        .with_body(r#"{"success":true,"data":{"plan":"pro","status":"trial","usage":{"used":1,"limit":-1,"unlimited":true},"trial":{"daysRemaining":4,"endsAt":"2026-10-20T00:00:00Z"}}}"#)
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    let snapshot = fetch_snapshot_with(&api, "explicit").unwrap();

    mock.assert();
    assert_eq!(snapshot.plan, Plan::Pro);
    assert_eq!(snapshot.trial.unwrap().days_remaining, 4);
}

#[test]
fn check_feature_reads_access_flag() {
    let mut server = Server::new();
    server
        .mock("GET", "/subscription/check-feature/smsReminders")
        .with_body(r#"{"success":true,"data":{"feature":"smsReminders","hasAccess":false}}"#)
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    assert!(!subscription::check_feature(&api, Feature::SmsReminders).unwrap());
}

#[test]
fn billing_history_decodes() {
    let mut server = Server::new();
    server
        .mock("GET", "/subscription/billing-history")
        .with_body(
            r#"{"success":true,"data":[{"id":"txn_1","status":"completed","amount":"9.00","currency":"USD","createdAt":"2026-09-01T00:00:00Z","receiptUrl":"https://r.test/1"}]}"#,
        )
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let rows = subscription::billing_history(&api).unwrap();
    assert_eq!(rows[0].receipt_url.as_deref(), Some("https://r.test/1"));
    assert_eq!(rows[0].billed_at, None);
}

// --- Payment ---

#[test]
fn redirect_checkout_exposes_url() {
    let mut server = Server::new();
    server
        .mock("POST", "/payment/checkout")
        .match_body(Matcher::Json(json!({"plan": "pro", "billingCycle": "yearly"})))
        .with_body(
            r#"{"success":true,"data":{"type":"redirect","processor":"polar","data":{"checkoutUrl":"https://pay.test/c/1","checkoutId":"c1"}}}"#,
        )
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let session = payment::create_checkout(&api, "pro", BillingPeriod::Yearly).unwrap();
    assert_eq!(session.kind, CheckoutKind::Redirect);
    assert_eq!(session.processor, Processor::Polar);
    assert_eq!(session.redirect_url(), Some("https://pay.test/c/1"));
}

#[test]
fn client_checkout_has_no_redirect() {
    let mut server = Server::new();
    server
        .mock("POST", "/payment/checkout")
        .with_body(
            r#"{"success":true,"data":{"type":"client","processor":"paddle","data":{"priceId":"pri_1","customerEmail":"ann@acme.test","customData":{"userId":"u1","organizationId":"o1"}}}}"#,
        )
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let session = payment::create_checkout(&api, "pro", BillingPeriod::Monthly).unwrap();
    assert_eq!(session.redirect_url(), None);
    assert_eq!(session.data.price_id.as_deref(), Some("pri_1"));
}

#[test]
fn portal_url_is_unwrapped() {
    let mut server = Server::new();
    server
        .mock("GET", "/payment/portal-url")
        .with_body(r#"{"success":true,"data":{"portalUrl":"https://portal.test/p"}}"#)
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    assert_eq!(payment::portal_url(&api).unwrap(), "https://portal.test/p");
}

// --- Invoices ---

#[test]
fn list_defaults_missing_channels_to_email() {
    let mut server = Server::new();
    server
        .mock("GET", "/invoice-reminder/invoices")
        .with_body(
            r#"{"success":true,"data":[
                {"_id":"a","clientName":"Acme","clientEmail":"a@acme.test","amount":100,"dueDate":"2026-10-01","status":"overdue"},
                {"_id":"b","clientName":"Beta","clientEmail":"b@beta.test","amount":50.5,"dueDate":"2026-12-01","status":"paid","reminderChannels":[]}
            ]}"#,
        )
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let list = invoices::list(&api).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].status, InvoiceStatus::Overdue);
    assert!(list[1].is_paid());
    for inv in &list {
        assert_eq!(inv.reminder_channels.len(), 1);
    }
}

#[test]
fn logs_decode_kinds() {
    let mut server = Server::new();
    server
        .mock("GET", "/invoice-reminder/invoices/a/logs")
        .with_body(
            r#"{"success":true,"data":[
                {"_id":"l1","type":"manual_reminder","sentAt":"2026-10-01T10:00:00Z"},
                {"_id":"l2","type":"after_due","sentAt":"2026-10-05T10:00:00Z","channel":"sms"}
            ]}"#,
        )
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    let logs = invoices::logs(&api, "a").unwrap();
    assert_eq!(logs[0].kind, ReminderKind::ManualReminder);
    assert_eq!(logs[1].kind.label(), "Overdue Reminder");
}

#[test]
fn mark_paid_uses_pay_route() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/invoice-reminder/invoices/a/pay")
        .with_body(r#"{"success":true}"#)
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    invoices::mark_paid(&api, "a").unwrap();
    mock.assert();
}

#[test]
fn unsuccessful_envelopes_are_errors() {
    let mut server = Server::new();
    let refused = r#"{"success":false,"error":"Not allowed"}"#;
    server
        .mock("DELETE", "/invoice-reminder/invoices/a")
        .with_body(refused)
        .create();
    server
        .mock("PUT", "/invoice-reminder/invoices/a/pay")
        .with_body(refused)
        .create();
    server
        .mock("POST", "/invoice-reminder/invoices/a/remind")
        .with_body(refused)
        .create();
    server
        .mock("POST", "/payment/cancel")
        .with_body(refused)
        .create();

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));
    assert_eq!(invoices::delete(&api, "a").unwrap_err().to_string(), "Not allowed");
    assert!(invoices::mark_paid(&api, "a").is_err());
    assert!(invoices::send_reminder(&api, "a").is_err());
    assert!(payment::cancel(&api).is_err());
}
