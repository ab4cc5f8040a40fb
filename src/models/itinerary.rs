//! Itinerary models: day plans, stops and nearby recommendations
//!
//! Field names on the wire follow the JSON contract given to the itinerary
//! model, so the same types deserialize model output and serialize the HTTP
//! responses consumed by the browser UI.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Coordinates;

/// One day of the trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayPlan {
    /// Day heading, e.g. "Day 1: Temples of Higashiyama"
    pub title: String,
    /// Stops in visiting order
    #[serde(rename = "itinerary")]
    pub stops: Vec<Stop>,
}

/// A single point of interest within a day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub name: String,
    pub description: String,
    #[serde(rename = "location")]
    pub coordinates: Coordinates,
    /// Short marker label shown on the map
    #[serde(default, deserialize_with = "display_string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_records")]
    pub nearby_food: Vec<FoodRec>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub nearby_hotels: Vec<HotelRec>,
}

/// Restaurant recommendation near a stop
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FoodRec {
    #[serde(default, deserialize_with = "display_string")]
    pub name: String,
    #[serde(default, deserialize_with = "display_string")]
    pub rating: String,
    #[serde(default, deserialize_with = "display_string")]
    pub price: String,
    #[serde(default, deserialize_with = "display_string")]
    pub description: String,
}

/// Hotel recommendation near a stop
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HotelRec {
    #[serde(default, deserialize_with = "display_string")]
    pub name: String,
    #[serde(default, deserialize_with = "display_string")]
    pub rating: String,
    #[serde(default, deserialize_with = "display_string")]
    pub price: String,
    #[serde(default, deserialize_with = "display_string")]
    pub distance: String,
    #[serde(default, deserialize_with = "display_string")]
    pub description: String,
}

/// Map marker derived from a stop
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MapMarker {
    pub label: String,
    pub name: String,
    pub coordinates: Coordinates,
}

/// Day as sent to the browser: the plan plus what its map view needs
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DayView {
    #[serde(flatten)]
    pub plan: DayPlan,
    pub center: Option<Coordinates>,
    pub markers: Vec<MapMarker>,
}

impl From<DayPlan> for DayView {
    fn from(plan: DayPlan) -> Self {
        Self {
            center: plan.map_center(),
            markers: plan.markers(),
            plan,
        }
    }
}

impl DayPlan {
    /// Center point for the day's map view
    #[must_use]
    pub fn map_center(&self) -> Option<Coordinates> {
        if self.stops.is_empty() {
            return None;
        }

        let count = self.stops.len() as f64;
        let (lat_sum, lng_sum) = self.stops.iter().fold((0.0, 0.0), |(lat, lng), stop| {
            (lat + stop.coordinates.lat, lng + stop.coordinates.lng)
        });

        Some(Coordinates::new(lat_sum / count, lng_sum / count))
    }

    /// Markers for every stop, numbered when the model gave no label
    #[must_use]
    pub fn markers(&self) -> Vec<MapMarker> {
        self.stops
            .iter()
            .enumerate()
            .map(|(index, stop)| MapMarker {
                label: if stop.label.trim().is_empty() {
                    (index + 1).to_string()
                } else {
                    stop.label.clone()
                },
                name: stop.name.clone(),
                coordinates: stop.coordinates,
            })
            .collect()
    }
}

/// Recommendation that can be built from a bare name
trait NamedRecord: Default {
    fn named(name: String) -> Self;
}

impl NamedRecord for FoodRec {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }
}

impl NamedRecord for HotelRec {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }
}

/// Recommendations carry no invariants: anything that is not a usable
/// record is dropped instead of failing the stop.
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: NamedRecord + DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).ok(),
            Value::String(name) if !name.trim().is_empty() => Some(T::named(name)),
            _ => None,
        })
        .collect())
}

/// Accept strings, numbers or null for fields that are only ever displayed
fn display_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, lat: f64, lng: f64, label: &str) -> Stop {
        Stop {
            name: name.to_string(),
            description: String::new(),
            coordinates: Coordinates::new(lat, lng),
            label: label.to_string(),
            nearby_food: Vec::new(),
            nearby_hotels: Vec::new(),
        }
    }

    #[test]
    fn test_day_plan_from_model_json() {
        let json = r#"{
            "day": 1,
            "title": "Day 1: Higashiyama",
            "itinerary": [{
                "name": "Kiyomizu-dera",
                "description": "Wooden stage temple",
                "location": {"lat": 34.9949, "lng": 135.785},
                "label": "A",
                "nearbyFood": [{"name": "Omen", "rating": 4.5, "price": "$$", "description": "Udon"}],
                "nearbyHotels": [{"name": "Hotel Kanra", "rating": "4.7", "price": 220, "distance": "1.2 km"}]
            }]
        }"#;

        let day: DayPlan = serde_json::from_str(json).unwrap();
        assert_eq!(day.title, "Day 1: Higashiyama");
        assert_eq!(day.stops.len(), 1);

        let first = &day.stops[0];
        assert_eq!(first.coordinates, Coordinates::new(34.9949, 135.785));
        assert_eq!(first.nearby_food[0].rating, "4.5");
        assert_eq!(first.nearby_hotels[0].price, "220");
        assert_eq!(first.nearby_hotels[0].description, "");
    }

    #[test]
    fn test_optional_stop_fields_default() {
        let json = r#"{"name": "Gion", "description": "Old quarter", "location": {"lat": 35.0037, "lng": 135.7788}}"#;
        let stop: Stop = serde_json::from_str(json).unwrap();
        assert_eq!(stop.label, "");
        assert!(stop.nearby_food.is_empty());
        assert!(stop.nearby_hotels.is_empty());
    }

    #[test]
    fn test_null_recommendations_become_empty() {
        let json = r#"{"name": "Gion", "description": "Old quarter", "location": {"lat": 35.0, "lng": 135.7},
            "nearbyFood": null, "nearbyHotels": "none nearby"}"#;
        let stop: Stop = serde_json::from_str(json).unwrap();
        assert!(stop.nearby_food.is_empty());
        assert!(stop.nearby_hotels.is_empty());
    }

    #[test]
    fn test_loose_recommendation_entries() {
        let json = r#"{"name": "Gion", "description": "Old quarter", "location": {"lat": 35.0, "lng": 135.7},
            "nearbyFood": ["Omen Udon", 42, null, {"name": "Gion Duck Noodles", "rating": 4.6}],
            "nearbyHotels": [{"name": "Ryokan", "distance": "300 m"}, "", ["nested"]]}"#;
        let stop: Stop = serde_json::from_str(json).unwrap();

        assert_eq!(stop.nearby_food.len(), 2);
        assert_eq!(stop.nearby_food[0].name, "Omen Udon");
        assert_eq!(stop.nearby_food[0].rating, "");
        assert_eq!(stop.nearby_food[1].rating, "4.6");
        assert_eq!(stop.nearby_hotels.len(), 1);
        assert_eq!(stop.nearby_hotels[0].distance, "300 m");
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let day = DayPlan {
            title: "Day 2".to_string(),
            stops: vec![stop("Arashiyama", 35.0094, 135.6668, "B")],
        };
        let value = serde_json::to_value(&day).unwrap();
        assert!(value["itinerary"].is_array());
        assert_eq!(value["itinerary"][0]["location"]["lng"], 135.6668);
        assert!(value["itinerary"][0]["nearbyFood"].is_array());
    }

    #[test]
    fn test_map_center_and_markers() {
        let day = DayPlan {
            title: "Day 1".to_string(),
            stops: vec![stop("North", 10.0, 20.0, ""), stop("South", 20.0, 40.0, "S")],
        };

        assert_eq!(day.map_center(), Some(Coordinates::new(15.0, 30.0)));

        let markers = day.markers();
        assert_eq!(markers[0].label, "1");
        assert_eq!(markers[1].label, "S");
        assert_eq!(markers[1].name, "South");
    }

    #[test]
    fn test_day_view_flattens_plan() {
        let day = DayPlan {
            title: "Day 3".to_string(),
            stops: vec![stop("Fushimi Inari", 34.9671, 135.7727, "")],
        };
        let value = serde_json::to_value(DayView::from(day)).unwrap();

        assert_eq!(value["title"], "Day 3");
        assert_eq!(value["itinerary"][0]["name"], "Fushimi Inari");
        assert_eq!(value["center"]["lat"], 34.9671);
        assert_eq!(value["markers"][0]["label"], "1");
    }

    #[test]
    fn test_map_center_without_stops() {
        let day = DayPlan {
            title: "Rest day".to_string(),
            stops: Vec::new(),
        };
        assert!(day.map_center().is_none());
        assert!(day.markers().is_empty());
    }
}
