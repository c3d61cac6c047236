//! Two-step signup driven against the real action endpoint.

#![allow(clippy::unwrap_used)]

use marquee_client::error::RejectionKind;
use marquee_client::{HttpTransport, SignupController, SignupError};
use marquee_core::{AccountId, Email};
use marquee_integration_tests::TestSite;

const FORM_ID: &str = "signup-form";
const MODAL_ID: &str = "signup-form-modal";

async fn controller(site: &TestSite) -> SignupController<HttpTransport> {
    let document = reqwest::get(site.url("/").unwrap())
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    SignupController::discover(
        &document,
        site.url("/ajax").unwrap(),
        HttpTransport::new().unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_register_then_complete_profile() {
    let site = TestSite::start().await.unwrap();
    let mut signup = controller(&site).await;

    signup
        .form_mut(FORM_ID)
        .unwrap()
        .set_email("  New.Reader@Example.com ");
    let user_id = signup.submit_email(FORM_ID).await.unwrap();
    assert_eq!(user_id, AccountId::new(1));
    assert_eq!(signup.active_modal(), Some(MODAL_ID));

    let modal = signup.modal_mut(MODAL_ID).unwrap();
    assert_eq!(modal.user_id.as_deref(), Some("1"));
    modal.set_names("Ada", "Lovelace");

    let message = signup.submit_profile(MODAL_ID).await.unwrap();
    assert_eq!(message, "Profile updated successfully!");
    assert_eq!(signup.active_modal(), None);

    let email = Email::parse("new.reader@example.com").unwrap();
    let account = site
        .state
        .accounts()
        .find_by_email(&email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.first_name, "Ada");
    assert_eq!(account.last_name, "Lovelace");
}

#[tokio::test]
async fn test_duplicate_email_shows_server_message() {
    let site = TestSite::start().await.unwrap();

    let mut first = controller(&site).await;
    first
        .form_mut(FORM_ID)
        .unwrap()
        .set_email("duplicate@example.com");
    first.submit_email(FORM_ID).await.unwrap();

    let mut second = controller(&site).await;
    second
        .form_mut(FORM_ID)
        .unwrap()
        .set_email("duplicate@example.com");
    let error = second.submit_email(FORM_ID).await.unwrap_err();

    assert!(matches!(
        error,
        SignupError::Rejected {
            kind: RejectionKind::Conflict,
            ..
        }
    ));
    let failure = second.form(FORM_ID).unwrap().failure.as_ref().unwrap();
    assert!(failure.visible);
    assert_eq!(failure.text, "This email address is already registered.");
    assert_eq!(second.active_modal(), None);
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let site = TestSite::start().await.unwrap();
    let mut signup = controller(&site).await;

    signup.form_mut(FORM_ID).unwrap().set_email("not-an-email");
    let error = signup.submit_email(FORM_ID).await.unwrap_err();

    assert!(matches!(error, SignupError::Rejected { .. }));
    let failure = signup.form(FORM_ID).unwrap().failure.as_ref().unwrap();
    assert_eq!(failure.text, "Please provide a valid email address.");
}
