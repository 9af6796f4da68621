use infinity_wall::color::BackgroundColor;
use infinity_wall::config::Configuration;
use infinity_wall::layout::{CellFill, GridMode};
use infinity_wall::parallax::CENTER_HIGHLIGHT_TOLERANCE;
use infinity_wall::sources::StaticSource;
use infinity_wall::wall::Wall;

fn wall_from(mode: GridMode, source: &StaticSource) -> Wall {
    let config = Configuration {
        mode,
        layout_seed: Some(5),
        ..Configuration::default()
    };
    Wall::new(config, source, 1280.0, 800.0)
}

fn photos() -> StaticSource {
    StaticSource::new(
        (0..4).map(|i| format!("https://example.com/{i}.jpg")).collect(),
        "#223344",
    )
}

#[test]
fn build_focuses_only_the_centered_dock_cell() {
    let wall = wall_from(GridMode::Dock, &photos());
    let center = wall.viewport().center().0;
    let visuals = wall.visuals();

    let focused: Vec<_> = visuals.iter().filter(|v| v.focused).collect();
    assert_eq!(focused.len(), 1);
    assert_eq!(focused[0].col, wall.layout().geometry().cols / 2);
    assert!((focused[0].screen_x - center).abs() < CENTER_HIGHLIGHT_TOLERANCE);
    for other in visuals.iter().filter(|v| !v.focused) {
        assert!((other.screen_x - center).abs() >= CENTER_HIGHLIGHT_TOLERANCE);
    }
}

#[test]
fn bad_background_repaints_fallback_cells_in_default_colour() {
    let source = StaticSource::new(vec!["not a url".into()], "#223344");
    let mut wall = wall_from(GridMode::Wall, &source);
    let first = wall.layout().cells()[0].id;
    assert_eq!(
        wall.layout().fill(first),
        CellFill::Background(BackgroundColor::parse("#223344").unwrap())
    );

    wall.set_background("bogus");
    assert_eq!(wall.background(), BackgroundColor::default());
    assert_eq!(wall.background().to_string(), "#181818");
    assert_eq!(
        wall.layout().fill(first),
        CellFill::Background(BackgroundColor::default())
    );
    assert!(wall.visuals().iter().all(|v| v.src.is_none()));
}

#[test]
fn reload_takes_images_and_falls_back_on_bad_colour() {
    let mut wall = wall_from(GridMode::Wall, &photos());
    wall.set_background("#abcdef");
    assert_eq!(wall.background().to_string(), "#abcdef");

    let broken = StaticSource::new(vec!["also not a url".into()], "nope");
    wall.reload(&broken);
    assert_eq!(wall.images(), ["also not a url"]);
    assert_eq!(wall.background(), BackgroundColor::default());
    let first = wall.layout().cells()[0].id;
    assert_eq!(
        wall.layout().fill(first),
        CellFill::Background(BackgroundColor::default())
    );

    wall.reload(&photos());
    assert_eq!(wall.background().to_string(), "#223344");
    assert!(matches!(wall.layout().fill(first), CellFill::Image(_)));
}
