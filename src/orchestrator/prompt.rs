use crate::models::{Profile, WeatherSnapshot};

/// Builds the system prompt for one conversational turn.
///
/// Pure function of its inputs: same profile, weather, booking URL and
/// fallback language always produce the same prompt. The booking and
/// weather sections appear only when there is something to say.
pub fn compose_system_prompt(
    profile: &Profile,
    weather: Option<&WeatherSnapshot>,
    booking_url: &str,
    fallback_language: &str,
) -> String {
    let mut prompt = format!(
        "You are a friendly, knowledgeable AI concierge for {name}.\n\
         Your job is to help guests with questions about the property, the local area, \
         check-in and check-out, amenities and activities.\n\
         \n\
         PROPERTY INFORMATION:\n\
         {content}",
        name = profile.name,
        content = profile.content,
    );

    if !booking_url.is_empty() {
        prompt.push_str(&format!(
            "\n\nDIRECT BOOKING:\n\
             If guests ask about booking, availability, prices or extending their stay, \
             point them to {booking_url} and mention that booking directly is \
             commission-free and usually cheaper.",
        ));
    }

    if let Some(weather) = weather {
        let daylight = if weather.is_day {
            "Yes"
        } else {
            "No (dark hours)"
        };
        prompt.push_str(&format!(
            "\n\nCURRENT WEATHER AT THE PROPERTY (as of {time}):\n\
             - Temperature: {temp}\u{00b0}C\n\
             - Conditions: {conditions}\n\
             - Wind: {wind} km/h\n\
             - Daylight: {daylight}\n\
             \n\
             Use this when guests ask about the weather, what to wear, or outdoor plans.",
            time = weather.observed_at,
            temp = weather.temperature,
            conditions = weather.description,
            wind = weather.wind_speed,
        ));
    }

    prompt.push_str(&format!(
        "\n\nLANGUAGE BEHAVIOR:\n\
         - Always respond in the language the guest writes in.\n\
         - If the guest's language is unclear, respond in {fallback_language}.\n\
         - Do not mention that you are matching their language; just answer naturally.\n\
         \n\
         RESPONSE GUIDELINES:\n\
         - Keep replies short and helpful; this is a messaging conversation.\n\
         - Use emoji sparingly but warmly.\n\
         - When recommending places, include a Google Maps link \
           (https://www.google.com/maps/search/?api=1&query=<place+city>).\n\
         - If you do not know something, say so honestly and suggest contacting the host.\n\
         - Never invent details that are not in the property information above.",
    ));

    prompt
}
