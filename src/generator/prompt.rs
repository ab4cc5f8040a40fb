//! Prompt construction for one day window

use super::DayWindow;
use crate::models::TripRequest;

/// Prompt asking the model for exactly the days of `window`, as a bare JSON array
#[must_use]
pub fn build_window_prompt(request: &TripRequest, window: &DayWindow) -> String {
    let destination = request.destination.trim();
    let day_numbers = window
        .days()
        .map(|day| day.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an expert travel planner. Plan days {start} to {end} of a {total}-day trip to {destination} with a total budget of ${budget:.0} for the whole trip.

Return ONLY a JSON array with exactly {count} objects, one per day, for days {day_numbers}. Do not include any text, explanation or markdown code fences before or after the array.

Each day object must follow this schema:
{{
  "day": <day number>,
  "title": "Day <day number>: <short theme for the day>",
  "itinerary": [
    {{
      "name": "<name of the place>",
      "description": "<one or two sentences on why to visit and what to do>",
      "location": {{ "lat": <latitude as a number>, "lng": <longitude as a number> }},
      "label": "<single letter map label, A for the first stop of the day>",
      "nearbyFood": [
        {{ "name": "<restaurant>", "rating": "<rating out of 5>", "price": "<price range>", "description": "<what to order>" }}
      ],
      "nearbyHotels": [
        {{ "name": "<hotel>", "rating": "<rating out of 5>", "price": "<price per night>", "distance": "<distance from the place>", "description": "<short note>" }}
      ]
    }}
  ]
}}

Rules:
- Use real, existing places in or near {destination} with their real-world coordinates.
- Plan 3 to 5 stops per day in a sensible visiting order.
- Recommend 1 to 2 restaurants and 1 to 2 hotels near each stop that fit the budget.
- Do not repeat places already planned for other days of the trip.
- Latitude and longitude must be plain numbers, not strings."#,
        start = window.start,
        end = window.end,
        total = request.day_count,
        budget = request.budget,
        count = window.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_fixes_window_and_contract() {
        let request = TripRequest::new(" Kyoto ", 900.0, 10);
        let prompt = build_window_prompt(&request, &DayWindow { start: 8, end: 10 });

        assert!(prompt.contains("days 8 to 10 of a 10-day trip to Kyoto"));
        assert!(prompt.contains("total budget of $900"));
        assert!(prompt.contains("exactly 3 objects"));
        assert!(prompt.contains("for days 8, 9, 10"));
        assert!(prompt.contains("Return ONLY a JSON array"));
        assert!(prompt.contains(r#""location": { "lat""#));
        assert!(prompt.contains("nearbyHotels"));
    }
}
