//! Render a descriptor four ways and save a short animated contact sheet.
//!
//! Run with: cargo run --example inspect_demo -- [descriptor.json] [config.json]
//!
//! Without arguments a built-in fox is used. Outputs PNG files to
//! target/effigy/.

use effigy::{AssetViewer, Panel, Result, ViewerConfig};

const OUT_DIR: &str = "target/effigy";
const FRAMES: usize = 4;
const FRAME_STEP: f32 = 0.2;

const FOX: &str = r##"{
    "baseShape": "ellipse",
    "width": 72,
    "height": 40,
    "colorPrimary": "#D9702B",
    "colorSecondary": "#7A3A12",
    "colorAccent": "#F6E7D2",
    "features": [
        {"label": "head", "type": "circle", "x": 14, "y": 12, "radius": 12, "color": "#D9702B"},
        {"label": "left ear", "type": "triangle", "points": [[6, 2], [10, -8], [14, 2]], "color": "#7A3A12"},
        {"label": "right ear", "type": "triangle", "points": [[14, 2], [18, -8], [22, 2]], "color": "#7A3A12"},
        {"label": "left eye", "type": "circle", "x": 10, "y": 10, "radius": 2.5, "color": "#FFFFFF"},
        {"label": "right eye", "type": "circle", "x": 18, "y": 10, "radius": 2.5, "color": "#FFFFFF"},
        {"label": "left pupil", "type": "circle", "x": 10, "y": 10, "radius": 1, "color": "#101010"},
        {"label": "right pupil", "type": "circle", "x": 18, "y": 10, "radius": 1, "color": "#101010"},
        {"label": "nose", "type": "circle", "x": 14, "y": 16, "radius": 1.5, "color": "#101010"},
        {"label": "front left leg", "type": "rect", "x": 20, "y": 32, "width": 5, "height": 10, "color": "#7A3A12"},
        {"label": "front right leg", "type": "rect", "x": 28, "y": 32, "width": 5, "height": 10, "color": "#7A3A12"},
        {"label": "back left leg", "type": "rect", "x": 50, "y": 32, "width": 5, "height": 10, "color": "#7A3A12"},
        {"label": "back right leg", "type": "rect", "x": 58, "y": 32, "width": 5, "height": 10, "color": "#7A3A12"},
        {"label": "tail", "type": "ellipse", "x": 70, "y": 14, "radiusX": 12, "radiusY": 5, "rotation": -0.6, "color": "#F6E7D2"}
    ]
}"##;

fn main() -> Result<()> {
    effigy::init_logging();

    let mut args = std::env::args().skip(1);
    let json = match args.next() {
        Some(path) => std::fs::read_to_string(path)?,
        None => FOX.to_owned(),
    };
    let config = match args.next() {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };

    std::fs::create_dir_all(OUT_DIR)?;
    let mut viewer = AssetViewer::from_json(&json, config);

    let anatomy = viewer.anatomy();
    println!(
        "{} features: head={:?} eyes={} legs={} tails={} wings={} other={}",
        viewer.descriptor().features.len(),
        anatomy.head,
        anatomy.eyes.len(),
        anatomy.legs.len(),
        anatomy.tails.len(),
        anatomy.wings.len(),
        anatomy.other.len(),
    );

    for frame in 0..FRAMES {
        let path = format!("{OUT_DIR}/frame_{frame:02}.png");
        viewer.save(&path)?;
        println!("  {path}");
        viewer.advance(FRAME_STEP);
    }

    for panel in Panel::ALL {
        let path = format!("{OUT_DIR}/{}.png", panel.name());
        effigy::RasterCanvas::from_image(viewer.render_panel(panel)).save(&path)?;
        println!("  {path}");
    }

    let stats = viewer.resource_stats();
    println!(
        "live resources: {} geometries, {} materials ({} created)",
        stats.live_geometries, stats.live_materials, stats.total_created
    );
    Ok(())
}
