use wellnote_core::{
    DayKey, ExerciseEntry, MealEntry, MealType, ParseError, SleepEntry, SleepQuality,
    UserSettings, DEFAULT_ROOM_TEMPERATURE_F,
};

#[test]
fn new_entries_start_unrated_and_empty() {
    let date = DayKey::parse("2024-05-01").unwrap();

    let sleep = SleepEntry::new(date);
    assert_eq!(sleep.sleep_quality, None);
    assert_eq!(sleep.room_temperature, DEFAULT_ROOM_TEMPERATURE_F);
    assert!(sleep.thoughts.is_empty());
    assert!(sleep.has_expected_temperature());

    let meal = MealEntry::new(date, MealType::Lunch);
    assert!(!meal.eaten);
    assert_eq!(meal.image_uri, None);

    assert!(!ExerciseEntry::new(date).completed);
}

#[test]
fn sleep_entry_uses_camel_case_wire_fields_and_null_quality() {
    let entry = SleepEntry::new(DayKey::parse("2024-05-01").unwrap());

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["date"], "2024-05-01");
    assert!(json["sleepQuality"].is_null());
    assert_eq!(json["roomTemperature"], 70);
    assert_eq!(json["thoughts"], "");

    let rated = SleepEntry {
        sleep_quality: Some(SleepQuality::Tired),
        room_temperature: 85,
        ..entry
    };
    let json = serde_json::to_value(&rated).unwrap();
    assert_eq!(json["sleepQuality"], "tired");
    assert!(!rated.has_expected_temperature());
    assert_eq!(serde_json::from_value::<SleepEntry>(json).unwrap(), rated);
}

#[test]
fn meal_entry_omits_absent_image_and_uses_camel_case_meal_types() {
    let entry = MealEntry::new(DayKey::parse("2024-05-01").unwrap(), MealType::AfternoonSnack);

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["mealType"], "afternoonSnack");
    assert!(json.get("imageUri").is_none());

    let decoded: MealEntry = serde_json::from_str(
        r#"{"date":"2024-05-01","mealType":"morningSnack","eaten":true,"notes":"apple","imageUri":"file:///a.jpg"}"#,
    )
    .unwrap();
    assert_eq!(decoded.meal_type, MealType::MorningSnack);
    assert_eq!(decoded.image_uri.as_deref(), Some("file:///a.jpg"));
}

#[test]
fn enum_text_parsing_matches_wire_values() {
    for meal_type in MealType::ALL {
        assert_eq!(meal_type.as_str().parse::<MealType>().unwrap(), meal_type);
        assert_eq!(MealType::ALL[meal_type.slot_index()], meal_type);
    }
    assert_eq!("great".parse::<SleepQuality>().unwrap(), SleepQuality::Great);
    assert_eq!(
        "Great".parse::<SleepQuality>(),
        Err(ParseError::UnknownSleepQuality("Great".to_string()))
    );
    assert!("brunch".parse::<MealType>().is_err());
}

#[test]
fn settings_use_original_wire_names() {
    let json = serde_json::to_value(UserSettings::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "wakeUpTime": "06:00",
            "bedTime": "22:00",
            "notificationsEnabled": true
        })
    );
}
