use clap::Parser;
use log::{error, info};
use mammarea_core::cli::{setup_logging, Cli, OutputFormat, StrokeArg};
use mammarea_core::{
    AnnotationSession, AutoThresholder, BrushMode, DicomReader, PointerEvent, Result,
    SessionOptions, SessionReport, Size,
};
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if !cli.file.is_file() {
        eprintln!("Error: {} is not a file", cli.file.display());
        process::exit(1);
    }

    let options = SessionOptions {
        thresholder: AutoThresholder::new(cli.bins),
        ..SessionOptions::default()
    };

    let mut session = match AnnotationSession::open(&DicomReader, &cli.file, Size::new(1, 1), options)
    {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to open {}: {}", cli.file.display(), e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Scripted strokes are given in image pixels: show the image 1:1
    let viewport = session.mask().dims().as_size();
    session.resize(viewport);
    session.set_brush_mode(cli.brush_mode.into());
    session.set_brush_radius(cli.brush_radius);
    for stroke in &cli.stroke {
        apply_stroke(&mut session, stroke, viewport, cli.brush_mode.into());
    }

    if let Err(e) = save_mask(&session, &cli) {
        error!("Failed to save mask: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    output_session(&session, cli.format);
}

fn apply_stroke(
    session: &mut AnnotationSession,
    stroke: &StrokeArg,
    viewport: Size,
    default_mode: BrushMode,
) {
    session.set_brush_mode(stroke.mode.unwrap_or(default_mode));
    let mut points = stroke.points.iter();
    if let Some(first) = points.next() {
        session.pointer_down(PointerEvent::new(*first, viewport));
        for point in points {
            session.pointer_move(PointerEvent::new(*point, viewport));
        }
    }
    if let Some(area) = session.pointer_up() {
        info!("Stroke applied, area now {} mm²", area);
    }
}

fn save_mask(session: &AnnotationSession, cli: &Cli) -> Result<()> {
    let saved = match (&cli.save, &cli.save_dir) {
        (Some(path), _) => session.export_mask(path)?,
        (None, Some(dir)) => session.export_mask_to_dir(dir, cli.mask_format.into())?,
        (None, None) => return Ok(()),
    };
    info!("Mask saved to {}", saved.display());
    Ok(())
}

fn output_session(session: &AnnotationSession, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", SessionReport::new(session));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(session) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                let _ = session;
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

#[cfg(feature = "json")]
fn output_json(session: &AnnotationSession) -> serde_json::Result<String> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct SessionJson<'a> {
        metadata: &'a mammarea_core::MammogramMetadata,
        threshold: f64,
        area: mammarea_core::AreaMeasurement,
    }

    serde_json::to_string_pretty(&SessionJson {
        metadata: session.metadata(),
        threshold: session.threshold(),
        area: session.area(),
    })
}
