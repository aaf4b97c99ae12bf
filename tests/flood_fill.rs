use eframe_whiteboard::{FillError, Surface, flood_fill};
use egui::Color32;
use image::Rgba;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// White board with an opaque black wall at x == 5
fn walled_surface() -> Surface {
    let mut surface = Surface::filled(10, 10, WHITE);
    for y in 0..10 {
        surface.put_pixel(5, y, BLACK);
    }
    surface
}

#[test]
fn test_fill_whole_white_surface() {
    let mut surface = Surface::filled(10, 10, WHITE);

    let report = flood_fill(&mut surface, (5, 5), Color32::from_rgb(0xff, 0x00, 0x00)).unwrap();

    assert_eq!(report.filled, 100);
    assert!(surface.pixels().pixels().all(|p| *p == RED));
}

#[test]
fn test_fill_stops_at_region_boundary() {
    let mut surface = walled_surface();

    let report = flood_fill(&mut surface, (2, 2), Color32::RED).unwrap();
    assert_eq!(report.filled, 50);

    for y in 0..10 {
        for x in 0..10 {
            let expected = match x {
                0..=4 => RED,
                5 => BLACK,
                _ => WHITE,
            };
            assert_eq!(surface.pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_fill_is_four_connected() {
    // A diagonal of black pixels does not let the fill leak through its gaps
    let mut surface = Surface::filled(6, 6, WHITE);
    for i in 0..6 {
        surface.put_pixel(i, 5 - i, BLACK);
    }

    flood_fill(&mut surface, (0, 0), Color32::RED).unwrap();

    assert_eq!(surface.pixel(0, 0), Some(RED));
    assert_eq!(surface.pixel(5, 5), Some(WHITE));
    assert_eq!(surface.pixel(4, 4), Some(WHITE));
}

#[test]
fn test_second_fill_changes_nothing() {
    let mut surface = walled_surface();
    flood_fill(&mut surface, (2, 2), Color32::RED).unwrap();
    let after_first = surface.as_raw().to_vec();

    flood_fill(&mut surface, (2, 2), Color32::RED).unwrap();

    assert_eq!(surface.as_raw(), &after_first[..]);
}

#[test]
fn test_fill_with_target_color_terminates() {
    // Filling white onto white would loop forever without a visited set
    let mut surface = Surface::filled(64, 64, WHITE);

    let report = flood_fill(&mut surface, (10, 10), Color32::WHITE).unwrap();

    assert_eq!(report.filled, 64 * 64);
    assert!(surface.pixels().pixels().all(|p| *p == WHITE));
}

#[test]
fn test_fill_matches_rgb_and_sets_opaque_alpha() {
    let mut surface = Surface::filled(4, 1, Rgba([0, 0, 255, 255]));
    surface.put_pixel(2, 0, Rgba([0, 0, 255, 40]));

    let report = flood_fill(&mut surface, (0, 0), Color32::GREEN).unwrap();

    assert_eq!(report.filled, 4);
    assert!(surface.pixels().pixels().all(|p| *p == Rgba([0, 255, 0, 255])));
}

#[test]
fn test_transparent_seed_is_rejected() {
    let mut surface = Surface::new(8, 8);
    let version = surface.version();

    let result = flood_fill(&mut surface, (3, 3), Color32::RED);

    assert_eq!(result, Err(FillError::NonFillable { x: 3, y: 3 }));
    assert_eq!(surface.version(), version);
    assert!(surface.as_raw().iter().all(|b| *b == 0));
}

#[test]
fn test_seed_outside_surface_is_rejected() {
    let mut surface = Surface::filled(8, 8, WHITE);

    for seed in [(-1, 0), (0, -1), (8, 0), (0, 8)] {
        let result = flood_fill(&mut surface, seed, Color32::RED);
        assert!(matches!(result, Err(FillError::SeedOutOfBounds { .. })), "seed {:?}", seed);
    }
    assert!(surface.pixels().pixels().all(|p| *p == WHITE));
}

#[test]
fn test_fill_on_translucent_region_keeps_other_pixels() {
    // Translucent black ink is fillable because only the fully transparent sentinel is refused
    let mut surface = Surface::new(5, 5);
    for x in 0..5 {
        surface.put_pixel(x, 2, Rgba([0, 0, 0, 128]));
    }

    let report = flood_fill(&mut surface, (0, 2), Color32::RED).unwrap();

    // The transparent sentinel shares black RGB, so the region spreads through it
    assert_eq!(report.filled, 25);
    assert!(surface.pixels().pixels().all(|p| *p == RED));
}
