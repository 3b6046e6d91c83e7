use pacal_core::data::printer::*;

#[test]
fn test_delta_center_is_origin() {
    let mut printer = PrinterProfile::hevo();
    printer.geometry = BedGeometry::Delta {
        radius: 150.0,
        size_z: 300.0,
    };
    assert_eq!(printer.center(), (0.0, 0.0));
    assert!(printer.geometry.is_delta());
}

#[test]
fn test_cartesian_center_is_half_size() {
    let printer = PrinterProfile::hevo();
    assert_eq!(printer.center(), (145.0, 145.0));
    assert!(!printer.geometry.is_delta());

    let printer = PrinterProfile::p3steel();
    assert_eq!(printer.center(), (90.0, 90.0));
}

#[test]
fn test_invalid_geometry_rejected() {
    let mut printer = PrinterProfile::p3steel();
    printer.geometry = BedGeometry::Cartesian {
        size_x: 0.0,
        size_y: 180.0,
        size_z: 180.0,
    };
    let err = printer.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for 'size_x' in profile 'P3Steel': must be > 0"
    );
}

#[test]
fn test_name_must_be_single_path_component() {
    let mut printer = PrinterProfile::hevo();
    printer.name = "../escaped".to_string();
    let err = printer.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for 'name' in profile '../escaped': must not contain path separators or '..'"
    );

    printer.name = "HEvo 0.8".to_string();
    assert!(printer.validate().is_ok());
}

#[test]
fn test_negative_retraction_rejected() {
    let mut printer = PrinterProfile::hevo();
    printer.retract_lift = -0.1;
    assert!(printer.validate().is_err());
}

#[test]
fn test_geometry_serde_tagged() {
    let json = serde_json::to_string(&BedGeometry::Delta {
        radius: 100.0,
        size_z: 250.0,
    })
    .unwrap();
    assert!(json.contains("\"type\":\"delta\""));

    let parsed: BedGeometry = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.center(), (0.0, 0.0));
}
