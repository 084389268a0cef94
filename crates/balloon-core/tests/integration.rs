//! Integration tests for the process_document() pipeline.
//!
//! Uses a MockSource that hands out pre-built PageContent, so no PDF backend
//! is involved.

use balloon_core::config::{FilterConfig, PipelineConfig, PlacementConfig};
use balloon_core::error::BalloonError;
use balloon_core::extraction::{PageContent, PageSource, TextLine, VectorRect};
use balloon_core::filter::filter_noise;
use balloon_core::model::{BBox, Feature, FeatureType, Point};
use balloon_core::report::Category;
use balloon_core::{extract_features, place_balloons, process_document, process_page};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rust_decimal_macros::dec;

struct MockSource {
    pages: Vec<PageContent>,
}

impl PageSource for MockSource {
    fn load_pages(&self) -> Result<Vec<PageContent>, BalloonError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct FailingSource;

impl PageSource for FailingSource {
    fn load_pages(&self) -> Result<Vec<PageContent>, BalloonError> {
        Err(BalloonError::Source("document is encrypted".into()))
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

const PAGE_W: f32 = 800.0;
const PAGE_H: f32 = 600.0;

fn page(number: usize, lines: &[(&str, [f32; 4])]) -> PageContent {
    let mut page = PageContent::new(number, PAGE_W, PAGE_H);
    page.lines = lines
        .iter()
        .map(|(text, [x0, y0, x1, y1])| TextLine::new(*text, BBox::new(*x0, *y0, *x1, *y1)))
        .collect();
    page
}

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> VectorRect {
    VectorRect {
        bbox: BBox::new(x0, y0, x1, y1),
    }
}

fn single_page(p: PageContent) -> Vec<Feature> {
    extract_features(&p, &PipelineConfig::default()).unwrap()
}

fn by_value<'a>(features: &'a [Feature], value: &str) -> &'a Feature {
    features
        .iter()
        .find(|f| f.value == value)
        .unwrap_or_else(|| panic!("no feature with value {value:?} in {features:#?}"))
}

// ---------------------------------------------------------------------------
// Test 1: GD&T callout with tolerance and datum
// ---------------------------------------------------------------------------
#[test]
fn gdt_callout_end_to_end() {
    let source = MockSource {
        pages: vec![page(0, &[("⏊ 0.01 A", [300.0, 200.0, 360.0, 212.0])])],
    };

    let result = process_document(&source, &PipelineConfig::default()).unwrap();

    assert_eq!(result.source, "mock");
    let features = result.features();
    assert_eq!(features.len(), 1);
    let f = &features[0];
    assert_eq!(f.id, Some(1));
    assert_eq!(f.feature_type, FeatureType::Gdt);
    assert_eq!(f.sub_type.as_deref(), Some("Perpendicularity"));
    let description = f.description.as_deref().unwrap();
    assert!(description.contains("Tol: 0.01"));
    assert!(description.contains("Datum: A"));
    assert_eq!(result.balloons().len(), 1);
}

// ---------------------------------------------------------------------------
// Test 2: Stacked tolerance lines merge into a diameter with a band
// ---------------------------------------------------------------------------
#[test]
fn stacked_tolerance_becomes_diameter() {
    let features = single_page(page(
        0,
        &[
            ("Ø 12.1", [300.0, 280.0, 330.0, 290.0]),
            ("+0.1", [300.0, 292.0, 320.0, 298.0]),
            ("0", [300.0, 300.0, 306.0, 306.0]),
        ],
    ));

    assert_eq!(features.len(), 1);
    let f = &features[0];
    assert_eq!(f.value, "Ø 12.1 +0.1 0");
    assert_eq!(f.feature_type, FeatureType::HoleRadius);
    assert_eq!(f.sub_type.as_deref(), Some("Diameter"));
    assert_eq!(f.min_val(), Some(dec!(12.1)));
    assert_eq!(f.max_val(), Some(dec!(12.2)));
    assert_eq!(f.location, BBox::new(300.0, 280.0, 330.0, 306.0));
}

// ---------------------------------------------------------------------------
// Test 3: Features inside a vector table are un-numbered
// ---------------------------------------------------------------------------
#[test]
fn table_cluster_suppresses_contents() {
    let mut p = page(
        0,
        &[
            ("12", [60.0, 55.0, 80.0, 65.0]),
            ("7.5", [110.0, 75.0, 130.0, 85.0]),
            ("30", [400.0, 300.0, 420.0, 310.0]),
        ],
    );
    p.rects = vec![
        rect(50.0, 50.0, 100.0, 70.0),
        rect(100.0, 50.0, 150.0, 70.0),
        rect(50.0, 70.0, 100.0, 90.0),
        rect(100.0, 70.0, 150.0, 90.0),
    ];

    let features = single_page(p);

    for value in ["12", "7.5"] {
        let f = by_value(&features, value);
        assert_eq!(f.id, None);
        assert_eq!(f.feature_type, FeatureType::Note);
        assert_eq!(f.sub_type.as_deref(), Some("Table/Content"));
    }
    assert_eq!(by_value(&features, "30").id, Some(3));
}

// ---------------------------------------------------------------------------
// Test 4: Zone labels along the border
// ---------------------------------------------------------------------------
#[test]
fn border_zone_label_suppressed_center_kept() {
    let features = single_page(page(
        0,
        &[
            ("3", [5.0, 300.0, 12.0, 308.0]),
            ("3", [400.0, 300.0, 407.0, 308.0]),
        ],
    ));

    assert_eq!(features[0].id, None);
    assert_eq!(features[0].sub_type.as_deref(), Some("Zone Index"));
    assert_eq!(features[1].id, Some(2));
    assert_eq!(features[1].sub_type.as_deref(), Some("Linear"));
}

#[test]
fn zone_reference_token_end_to_end() {
    let features = single_page(page(
        0,
        &[
            ("A3", [4.0, 300.0, 16.0, 308.0]),
            ("A3", [400.0, 300.0, 412.0, 308.0]),
        ],
    ));

    assert_eq!(features.len(), 2);
    assert_eq!(features[0].id, None);
    assert_eq!(features[0].sub_type.as_deref(), Some("Zone Index"));
    assert_eq!(features[1].id, Some(2));
    assert_eq!(features[1].value, "3");
    assert_eq!(features[1].feature_type, FeatureType::LinearDimension);
}

#[test]
fn alphanumeric_zone_label_filtered() {
    let p = PageContent::new(0, PAGE_W, PAGE_H);
    let label = |x0: f32| Feature {
        id: Some(1),
        feature_type: FeatureType::LinearDimension,
        sub_type: Some("Linear".into()),
        value: "A3".into(),
        description: None,
        location: BBox::new(x0, 300.0, x0 + 12.0, 308.0),
        page_num: 0,
        tolerance: None,
    };

    let filtered = filter_noise(vec![label(4.0), label(400.0)], &p, &FilterConfig::default());

    assert_eq!(filtered[0].id, None);
    assert_eq!(filtered[0].sub_type.as_deref(), Some("Zone Index"));
    assert_eq!(filtered[1], label(400.0));
}

// ---------------------------------------------------------------------------
// Test 5: Thread callouts win over generic dimensions
// ---------------------------------------------------------------------------
#[test]
fn thread_takes_priority_over_dimension() {
    let features = single_page(page(0, &[("M8x1.25", [300.0, 200.0, 350.0, 210.0])]));

    assert_eq!(features[0].feature_type, FeatureType::Thread);
    assert_eq!(features[0].sub_type.as_deref(), Some("Thread"));
    assert_eq!(features[0].tolerance, None);
}

// ---------------------------------------------------------------------------
// Test 6: Noise filtering is idempotent
// ---------------------------------------------------------------------------
#[test]
fn noise_filter_idempotent() {
    let mut p = page(
        0,
        &[
            ("HOLE TABLE", [400.0, 100.0, 480.0, 110.0]),
            ("6.5", [420.0, 130.0, 440.0, 140.0]),
            ("MATERIAL: AL 6061", [500.0, 500.0, 600.0, 510.0]),
            ("REV B", [520.0, 520.0, 560.0, 530.0]),
            ("25", [560.0, 540.0, 580.0, 550.0]),
            ("4", [400.0, 2.0, 408.0, 10.0]),
            ("10 +0.2/-0.1", [200.0, 200.0, 260.0, 210.0]),
        ],
    );
    p.rects = vec![rect(100.0, 480.0, 300.0, 520.0)];
    let config = FilterConfig::default();

    let once = single_page(p.clone());
    let twice = filter_noise(once.clone(), &p, &config);

    assert_eq!(once, twice);
    assert_eq!(by_value(&once, "6.5").id, None);
    assert_eq!(by_value(&once, "25").sub_type.as_deref(), Some("TitleBlock/Context"));
    assert!(by_value(&once, "10 +0.2/-0.1").is_numbered());
}

// ---------------------------------------------------------------------------
// Test 7: Numbered features never carry degenerate boxes
// ---------------------------------------------------------------------------
#[test]
fn numbered_features_have_real_boxes() {
    let features = single_page(page(
        0,
        &[
            ("25", [100.0, 100.0, 100.0, 110.0]),
            ("40", [200.0, 100.0, 220.0, 100.0]),
            ("55", [300.0, 100.0, 320.0, 110.0]),
        ],
    ));

    assert_eq!(features.len(), 1);
    assert_eq!(features[0].value, "55");
    assert_eq!(features[0].id, Some(1));
    for f in features.iter().filter(|f| f.is_numbered()) {
        assert!(f.location.x1 > f.location.x0 && f.location.y1 > f.location.y0);
    }
}

// ---------------------------------------------------------------------------
// Test 8: Balloons on a crowded page do not overlap
// ---------------------------------------------------------------------------
#[test]
fn crowded_page_balloons_do_not_overlap() {
    let values = ["10", "20", "35", "40", "55", "60", "75", "80"];
    let lines: Vec<(&str, [f32; 4])> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = 200.0 + (i % 4) as f32 * 40.0;
            let y = 200.0 + (i / 4) as f32 * 30.0;
            (*v, [x, y, x + 20.0, y + 10.0])
        })
        .collect();

    let result = process_page(&page(0, &lines), &PipelineConfig::default()).unwrap();

    assert_eq!(result.balloons.len(), values.len());
    for (i, a) in result.balloons.iter().enumerate() {
        for b in &result.balloons[i + 1..] {
            if a.fallback || b.fallback {
                continue;
            }
            assert!(
                !a.footprint().intersects(&b.footprint()),
                "balloon {} overlaps {}",
                a.label,
                b.label
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Test 9: Numbering restarts on every page
// ---------------------------------------------------------------------------
#[test]
fn ids_restart_per_page() {
    let source = MockSource {
        pages: vec![
            page(
                0,
                &[
                    ("12", [200.0, 200.0, 220.0, 210.0]),
                    ("M6", [300.0, 200.0, 320.0, 210.0]),
                ],
            ),
            page(1, &[("18", [200.0, 200.0, 220.0, 210.0])]),
        ],
    };

    let result = process_document(&source, &PipelineConfig::default()).unwrap();

    assert_eq!(result.pages.len(), 2);
    let ids: Vec<(usize, Option<u32>)> = result
        .features()
        .iter()
        .map(|f| (f.page_num, f.id))
        .collect();
    assert_eq!(ids, vec![(0, Some(1)), (0, Some(2)), (1, Some(1))]);
    assert_eq!(result.pages[1].balloons[0].feature_id, 1);
    assert_eq!(result.pages[1].balloons[0].page_num, 1);
}

// ---------------------------------------------------------------------------
// Test 10: Raster frames continue the text numbering
// ---------------------------------------------------------------------------
#[test]
fn raster_frames_numbered_after_text() {
    let mut img = GrayImage::from_pixel(800, 600, Luma([255]));
    draw_hollow_rect_mut(&mut img, Rect::at(300, 400).of_size(80, 24), Luma([0]));
    let mut p = page(0, &[("25", [100.0, 100.0, 120.0, 110.0])]);
    p.raster = Some(DynamicImage::ImageLuma8(img));

    let features = single_page(p.clone());

    assert_eq!(features.len(), 2);
    let frame = by_value(&features, "Frame");
    assert_eq!(frame.id, Some(2));
    assert_eq!(frame.feature_type, FeatureType::Gdt);
    assert_eq!(frame.location, BBox::new(300.0, 400.0, 380.0, 424.0));

    let mut config = PipelineConfig::default();
    config.frames.enabled = false;
    assert_eq!(extract_features(&p, &config).unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test 11: Report groups the document's numbered features
// ---------------------------------------------------------------------------
#[test]
fn document_report_sections() {
    let source = MockSource {
        pages: vec![page(
            0,
            &[
                ("10.00±0.02", [200.0, 150.0, 260.0, 160.0]),
                ("M8x1.25", [200.0, 250.0, 250.0, 260.0]),
                ("R5", [300.0, 250.0, 320.0, 260.0]),
                ("SCALE 1:2", [600.0, 560.0, 660.0, 570.0]),
            ],
        )],
    };

    let report = process_document(&source, &PipelineConfig::default())
        .unwrap()
        .report();

    let titles: Vec<&str> = report.sections.iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Critical Dimensions", "Holes / Diameters", "Threads"]);
    assert_eq!(report.metadata.get("SCALE").map(String::as_str), Some("1:2"));
    let critical = report.section(Category::Critical).unwrap();
    assert_eq!(critical.rows[0].min, Some(dec!(9.98)));
}

// ---------------------------------------------------------------------------
// Test 12: Error cases
// ---------------------------------------------------------------------------
#[test]
fn invalid_page_geometry_rejected() {
    let source = MockSource {
        pages: vec![PageContent::new(3, PAGE_W, f32::NAN)],
    };

    match process_document(&source, &PipelineConfig::default()) {
        Err(BalloonError::InvalidPage { page, .. }) => assert_eq!(page, 3),
        other => panic!("expected InvalidPage, got {other:?}"),
    }
}

#[test]
fn source_failure_propagates() {
    let err = process_document(&FailingSource, &PipelineConfig::default()).unwrap_err();
    assert!(err.to_string().contains("encrypted"));
}

#[test]
fn empty_document_is_not_an_error() {
    let source = MockSource { pages: vec![] };
    let result = process_document(&source, &PipelineConfig::default()).unwrap();
    assert!(result.pages.is_empty());
    assert_eq!(result.report().row_count(), 0);
}

#[test]
fn hand_built_config_is_validated() {
    let mut config = PipelineConfig::default();
    config.placement.offset_step = 0.0;
    config.placement.max_offset = 16.0;
    let p = page(0, &[("40", [300.0, 200.0, 320.0, 210.0])]);

    assert!(matches!(
        process_page(&p, &config),
        Err(BalloonError::ConfigInvalid(_))
    ));
    let source = MockSource { pages: vec![p] };
    assert!(matches!(
        process_document(&source, &config),
        Err(BalloonError::ConfigInvalid(_))
    ));
}

#[test]
fn placement_with_zero_step_terminates() {
    let features = single_page(page(0, &[("40", [300.0, 200.0, 320.0, 210.0])]));
    let placement = PlacementConfig {
        offset_step: 0.0,
        max_offset: 16.0,
        ..PlacementConfig::default()
    };

    let balloons = place_balloons(&features, &placement);

    assert_eq!(balloons.len(), 1);
    assert_eq!(balloons[0].center, Point::new(343.0, 205.0));
}
