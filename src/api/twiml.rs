use quick_xml::escape::escape;

/// Renders a single-message TwiML document, the response format Twilio
/// expects from a WhatsApp webhook.
pub fn message_response(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(body)
    )
}
