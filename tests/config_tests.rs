use infinity_wall::config::Configuration;
use infinity_wall::layout::GridMode;
use std::path::PathBuf;
use std::time::Duration;
use wall_config::{ParallaxPolicy, ScaleSuppression};

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.mode, GridMode::Wall);
    assert_eq!(cfg.background_color, "#181818");
    assert_eq!(cfg.frame_interval, Duration::from_millis(16));
    assert_eq!(cfg.grid.overscan, 3);
    assert_eq!(cfg.parallax.policy, ParallaxPolicy::FocusBand);
    assert_eq!(cfg.parallax.suppression, ScaleSuppression::Motion);
    assert!((cfg.momentum.friction - 0.92).abs() < f64::EPSILON);
    assert_eq!(cfg.edge_stretch.duration, Duration::from_millis(180));
    assert_eq!(cfg.export.iframe_height, 600);
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r##"
mode: dock
background-color: "#EEECE5"
images:
  - https://example.com/a.jpg
  - photos/b.jpg
image-directory: "/photos"
inline-images: true
layout-seed: 42
frame-interval: 8ms
grid:
  narrow-breakpoint: 480
  wide:
    cell-size: 150
    gap: 40
parallax:
  policy: falloff
  suppression: dragging
  hover-scale: 1.1
momentum:
  friction: 0.9
snap:
  easing: 0.25
scale-loop:
  settle-delay: 1s
edge-stretch:
  enabled: false
export:
  origin: https://wall.example.com
"##;
    let cfg = Configuration::from_yaml_str(yaml).unwrap().validated().unwrap();
    assert_eq!(cfg.mode, GridMode::Dock);
    assert_eq!(cfg.images.len(), 2);
    assert_eq!(cfg.image_directory, Some(PathBuf::from("/photos")));
    assert!(cfg.inline_images);
    assert_eq!(cfg.layout_seed, Some(42));
    assert_eq!(cfg.frame_interval, Duration::from_millis(8));
    assert_eq!(cfg.grid.narrow_breakpoint, 480.0);
    assert_eq!(cfg.grid.wide.cell_size, 150.0);
    assert_eq!(cfg.grid.narrow.cell_size, 80.0);
    assert_eq!(cfg.parallax.policy, ParallaxPolicy::Falloff);
    assert_eq!(cfg.parallax.suppression, ScaleSuppression::Dragging);
    assert!((cfg.snap.easing - 0.25).abs() < f64::EPSILON);
    assert_eq!(cfg.scale_loop.settle_delay, Duration::from_secs(1));
    assert!(!cfg.edge_stretch.enabled);
    assert_eq!(cfg.export.origin, "https://wall.example.com");
    assert_eq!(cfg.background().to_string(), "#eeece5");
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = r#"
grid:
  columns: 12
"#;
    assert!(Configuration::from_yaml_str(yaml).is_err());
}

#[test]
fn invalid_background_fails_validation() {
    let yaml = r#"
background-color: "teal-ish"
"#;
    let err = Configuration::from_yaml_str(yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(format!("{err:#}").contains("background-color"));
}

#[test]
fn zero_frame_interval_fails_validation() {
    let yaml = r#"
frame-interval: 0s
"#;
    let err = Configuration::from_yaml_str(yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(err.to_string().contains("frame-interval"));
}

#[test]
fn nested_validation_names_the_key() {
    let yaml = r#"
snap:
  easing: 1.5
"#;
    let err = Configuration::from_yaml_str(yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(err.to_string().contains("snap.easing"));
}
