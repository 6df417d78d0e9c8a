//! Map icons by event type

/// Icon for event types without a dedicated one
pub const DEFAULT_ICON: &str = "📍";

/// Icon for an event type path; only the last segment is significant
pub fn icon_for(event_type: &str) -> &'static str {
    let leaf = event_type.rsplit('/').next().unwrap_or(event_type);
    match leaf {
        "vehicle_obstruction" => "🚙",
        "general_obstruction" => "⚠️",
        "animal_presence_obstruction" => "🦌",
        "abnormal_traffic" => "🚦",
        "poor_environment_conditions" => "☁️",
        "road_surface_conditions" => "❄️",
        "non_weather_related_road_conditions" => "🕳️",
        "roadworks" | "maintenance_works" => "🚧",
        "road_or_carriageway_or_lane_management" => "🚫",
        "speed_management" => "🐢",
        "general_instruction_or_message_to_road_users" => "ℹ️",
        _ => DEFAULT_ICON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_icons() {
        assert_eq!(icon_for("roadworks"), "🚧");
        assert_eq!(icon_for("maintenance_works"), "🚧");
        assert_eq!(icon_for("animal_presence_obstruction"), "🦌");
        assert_eq!(icon_for("speed_management"), "🐢");
    }

    #[test]
    fn test_nested_path_uses_leaf() {
        assert_eq!(icon_for("causes/abnormal_traffic"), "🚦");
    }

    #[test]
    fn test_unknown_and_empty_fall_back() {
        assert_eq!(icon_for("accident"), DEFAULT_ICON);
        assert_eq!(icon_for(""), DEFAULT_ICON);
        assert_eq!(icon_for("generic_situation_record"), DEFAULT_ICON);
    }
}
