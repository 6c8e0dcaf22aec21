use anyhow::{anyhow, Context, Result};
use pathmarker_core::viewer::script::parse_script;
use pathmarker_core::viewer::{
    ImageHint, ImageViewer, ListenerRegistry, RenderedImage, ViewerResponse,
};
use serde::Serialize;

use crate::commands::open_context;

/// Final state after replaying a viewer script.
#[derive(Debug, Serialize)]
pub struct ViewReport {
    pub events: usize,
    pub closed: bool,
    /// Frame at the end of the script (or just before closing).
    pub frame: RenderedImage,
    pub listeners_left: bool,
}

/// Replay `script` against a viewer opened on `image`. Replay stops at the
/// first event that closes the viewer.
pub fn run_viewer_script(image: &str, script: &str, hint: ImageHint) -> Result<ViewReport> {
    let events = parse_script(script).context("Invalid viewer script")?;
    let registry = ListenerRegistry::new();
    let mut viewer = ImageViewer::open(image, hint, &registry)
        .ok_or_else(|| anyhow!("No image to view"))?;

    let mut applied = 0;
    let mut closed = false;
    for event in events {
        applied += 1;
        if viewer.handle(event) == ViewerResponse::Close {
            closed = true;
            break;
        }
    }
    let frame = viewer.render();
    viewer.close();

    Ok(ViewReport { events: applied, closed, frame, listeners_left: !registry.is_empty() })
}

/// Drive the image viewer from a textual event script and print its state.
///
/// The sizing hint comes from `aspect_ratio` when given, else from the
/// session's last analysis.
pub fn view_command(
    root: &str,
    image: &str,
    script: &str,
    session: Option<String>,
    aspect_ratio: Option<f64>,
    json: bool,
) -> Result<()> {
    let hint = match (aspect_ratio, session) {
        (Some(ratio), _) => ImageHint::from_aspect_ratio(ratio),
        (None, Some(session_id)) => {
            let ctx = open_context(root)?;
            ctx.db
                .load_last_analysis(&session_id)
                .context("Failed to load the last analysis")?
                .map(|last| ImageHint::from_analysis(image, &last.response))
                .unwrap_or_default()
        }
        (None, None) => ImageHint::default(),
    };

    let report = run_viewer_script(image, script, hint)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let frame = &report.frame;
    println!("Image: {}", frame.src);
    println!("Events: {}", report.events);
    println!("Zoom: {}", frame.zoom_label);
    println!("Transform: {}", frame.transform);
    println!("Transition: {}", frame.transition);
    println!("Cursor: {}", frame.cursor);
    println!("Max size: {} x {}", frame.style.max_width, frame.style.max_height);
    if let Some(ratio) = &frame.style.aspect_ratio {
        println!("Aspect ratio: {ratio}");
    }
    println!("Closed: {}", if report.closed { "yes" } else { "no" });
    Ok(())
}
