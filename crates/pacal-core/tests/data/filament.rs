use approx::assert_relative_eq;
use pacal_core::data::filament::*;

#[test]
fn test_builtin_filaments() {
    let pla = FilamentProfile::pla();
    assert_eq!(pla.name(), "PLA");
    assert_eq!(pla.bed_layer0_temp(), 70);
    assert_eq!(pla.hotend_layer0_temp(), 215);
    assert_eq!(pla.fan_speed(), 100.0);
    assert_eq!(pla.fan_layer0_speed(), 0.0);
    assert_relative_eq!(pla.extrusion_multiplier(), 1.0);

    let petg = FilamentProfile::petg();
    assert_eq!(petg.bed_temp(), 90);
    assert_eq!(petg.hotend_temp(), 260);
    assert!(petg.validate().is_ok());
}

#[test]
fn test_serialized_form_keeps_percentage() {
    let json = serde_json::to_value(FilamentProfile::pla()).unwrap();
    assert_eq!(json["extrusion_factor"], 100.0);
    assert_eq!(json["name"], "PLA");

    let parsed: FilamentProfile = serde_json::from_value(json).unwrap();
    assert_relative_eq!(parsed.extrusion_multiplier(), 1.0);
}

#[test]
fn test_toml_profile_parses() {
    let text = r#"
        name = "ASA"
        diameter = 1.75
        extrusion_factor = 95.0
        density = 1.07
        bed_temp = 100
        bed_layer0_temp = 105
        hotend_temp = 250
        hotend_layer0_temp = 255
        fan_speed = 20.0
        fan_layer0_speed = 0.0
    "#;
    let asa: FilamentProfile = toml::from_str(text).unwrap();
    assert_eq!(asa.name(), "ASA");
    assert_relative_eq!(asa.extrusion_multiplier(), 0.95);
    assert_eq!(asa.hotend_layer0_temp(), 255);
}

#[test]
fn test_zero_flow_rejected() {
    let bad = FilamentProfile::new("Dry", 1.75, 0.0, 1.2, 60, 60, 200, 200, 0.0, 0.0);
    assert!(bad.validate().is_err());
}
