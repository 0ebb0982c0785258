use crate::models::chat::ItineraryContext;
use crate::models::trip::TripForm;

const CHAT_PERSONA: &str = "You are SANCHAARA AI, a concise travel concierge for INCREDIBLE INDIA. Rules: Friendly, max 2 sentences, use emojis.";

pub fn destination_check_prompt(destination: &str) -> String {
    format!(
        "Is the location \"{destination}\" situated within the country of INDIA?\n\
         Reply strictly with only the word \"TRUE\" or \"FALSE\". If it's outside India, reply \"FALSE\"."
    )
}

/// The validator is told to answer TRUE/FALSE but sometimes adds punctuation or prose.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_uppercase().contains("TRUE")
}

pub fn itinerary_prompt(form: &TripForm) -> String {
    let destination = form.destination();
    let interests = form.interests.join(", ");
    let start_date = form.start_date.as_deref().unwrap_or("the travel dates");

    let modification_note = form
        .special_instruction()
        .map(|instruction| {
            format!(
                "\n⚠️ SPECIAL MODIFICATION: {instruction}. You MUST adjust the itinerary to reflect this change."
            )
        })
        .unwrap_or_default();

    let dates_line = form
        .travel_window()
        .map(|(first, last)| {
            format!(
                "\nTravel dates: {} to {}.",
                first.format("%d %B %Y"),
                last.format("%d %B %Y")
            )
        })
        .unwrap_or_default();

    format!(
        r#"Act as an expert Indian Travel Guide, Logistics Analyst, and Financial Planner.
Generate a {days}-day travel plan from {origin} to {destination}, India.
Travelers: {travelers} | Total Budget Limit: ₹{budget} | Interests: {interests} {modification_note}{dates_line}

STRICT OUTPUT RULES:
1. localPulse: Identify real festivals/events in {destination} on these dates. MUST be an array of simple strings.
2. budgetAnalysis: Split ₹{budget} logically. Total and perPerson must be simple strings (e.g., "₹50,000").
3. weather icon: Use ONLY one real emoji (☀️, 🌧️, ☁️, 🌫️, 🌩️).
4. Places: Include rank(1-10), time, trafficStatus(Low/Moderate/High), distance/time from previous stop, and alternativePlace.

JSON FORMAT (MANDATORY):
{{
  "localPulse": ["..."],
  "budgetAnalysis": {{ "total": "₹...", "perPerson": "₹...", "breakdown": {{ "stay": "₹...", "food": "₹...", "transport": "₹...", "sightseeing": "₹..." }} }},
  "initialLogistics": {{ "from": "{origin}", "to": "Nearest Hub", "mode": "...", "distance": "km", "duration": "..." }},
  "arrivalLogistics": {{ "from": "Hub", "to": "First Spot", "distance": "km", "duration": "..." }},
  "seasonalNote": "Advice for {start_date}",
  "days": [{{
    "dayNumber": 1, "date": "...", "cityLocation": "...",
    "weather": {{ "temp": "...", "condition": "...", "icon": "emoji", "advice": "..." }},
    "dailyDose": {{ "recipe": "...", "movie": "...", "game": "..." }},
    "places": [{{ "name": "...", "rank": 9.5, "time": "...", "trafficStatus": "...", "distanceFromPrevious": "...", "travelTimeFromPrevious": "...", "description": "...", "alternativePlace": "...", "altReason": "..." }}]
  }}],
  "estimatedTotalCost": "₹... total for {travelers} people"
}}"#,
        days = form.days,
        origin = form.origin,
        travelers = form.travelers,
        budget = form.budget,
    )
}

pub fn chat_system_instruction(context: Option<&ItineraryContext>) -> String {
    let mut instruction = CHAT_PERSONA.to_string();
    if let Some(context) = context {
        let destination = context.destination.as_deref().unwrap_or("their destination");
        let places = context
            .places_mentioned
            .as_ref()
            .map(|places| places.join(", "))
            .unwrap_or_default();
        instruction.push_str(&format!(
            " The user is exploring {destination}. Current spots: {places}. Answer accordingly."
        ));
        if let Some(days) = context.total_days {
            instruction.push_str(&format!(" The trip lasts {days} days."));
        }
    }
    instruction
}
