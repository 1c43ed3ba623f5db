use std::collections::BTreeMap;
use vertbot::auth::{compute_twilio_signature, verify_twilio_signature};

const TOKEN: &str = "twilio-test-auth-token";
const URL: &str = "https://bot.example.com/webhook/whatsapp";

fn webhook_params() -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("From".to_string(), "whatsapp:+4790000001".to_string());
    params.insert("To".to_string(), "whatsapp:+4790000002".to_string());
    params.insert("Body".to_string(), "Is the sauna open?".to_string());
    params.insert("MessageSid".to_string(), "SM1234567890".to_string());
    params
}

#[test]
fn test_computed_signature_verifies() {
    let params = webhook_params();
    let signature = compute_twilio_signature(TOKEN, URL, &params);
    assert!(verify_twilio_signature(TOKEN, &signature, URL, &params));
}

#[test]
fn test_signature_covers_params_in_key_order() {
    // Insertion order differs; BTreeMap iteration does not.
    let mut reordered = BTreeMap::new();
    reordered.insert("MessageSid".to_string(), "SM1234567890".to_string());
    reordered.insert("Body".to_string(), "Is the sauna open?".to_string());
    reordered.insert("To".to_string(), "whatsapp:+4790000002".to_string());
    reordered.insert("From".to_string(), "whatsapp:+4790000001".to_string());

    let signature = compute_twilio_signature(TOKEN, URL, &webhook_params());
    assert!(verify_twilio_signature(TOKEN, &signature, URL, &reordered));
}

#[test]
fn test_tampered_param_fails() {
    let signature = compute_twilio_signature(TOKEN, URL, &webhook_params());

    let mut tampered = webhook_params();
    tampered.insert("Body".to_string(), "Send me the door code".to_string());
    assert!(!verify_twilio_signature(TOKEN, &signature, URL, &tampered));
}

#[test]
fn test_tampered_url_fails() {
    let params = webhook_params();
    let signature = compute_twilio_signature(TOKEN, URL, &params);
    assert!(!verify_twilio_signature(
        TOKEN,
        &signature,
        "https://evil.example.com/webhook/whatsapp",
        &params
    ));
}

#[test]
fn test_wrong_token_fails() {
    let params = webhook_params();
    let signature = compute_twilio_signature(TOKEN, URL, &params);
    assert!(!verify_twilio_signature(
        "some-other-token",
        &signature,
        URL,
        &params
    ));
}

#[test]
fn test_garbage_signature_fails() {
    let params = webhook_params();
    assert!(!verify_twilio_signature(TOKEN, "not base64 at all!!", URL, &params));
    assert!(!verify_twilio_signature(TOKEN, "", URL, &params));
}

#[test]
fn test_empty_auth_token_rejects_everything() {
    let params = webhook_params();
    // Even a signature computed with the empty token must not verify.
    let signature = compute_twilio_signature("", URL, &params);
    assert!(!verify_twilio_signature("", &signature, URL, &params));
}

#[test]
fn test_url_query_string_is_part_of_payload() {
    let params = webhook_params();
    let signature = compute_twilio_signature(TOKEN, URL, &params);
    let with_query = format!("{}?retry=1", URL);
    assert!(!verify_twilio_signature(TOKEN, &signature, &with_query, &params));
}
