use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use path_maker::{
    EditSession, HandleId, LoadError, OverlayOptions, PathDocument, Point, Style,
    build_overlay,
};
use tracing_subscriber::EnvFilter;

/// Inspect, normalize and edit SVG path data
///
/// Examples:
///   path-maker show "M 0,21.5 C 4,21.5 4,0 12,0.5"
///   path-maker normalize shape.xml
///   path-maker save "M0,0 L10,10" -o shape.xml --stroke Red
///   path-maker move shape.xml --handle 1 --to 5,5
///   path-maker translate shape.xml --figure 0 --by 2,-3
#[derive(Parser, Debug)]
#[command(name = "path-maker", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print figures, control points, control lines and bounds
    Show {
        /// Path file, or literal path data
        input: String,
    },
    /// Print the canonical form of the path data
    Normalize {
        /// Path file, or literal path data
        input: String,
    },
    /// Write path data to a path file
    Save {
        /// Path file, or literal path data
        input: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        stroke: Option<String>,
        #[arg(long)]
        fill: Option<String>,
        #[arg(long)]
        thickness: Option<f64>,
    },
    /// Drag one control point and rewrite the file
    Move {
        file: PathBuf,
        /// Handle number as printed by `show`
        #[arg(long)]
        handle: usize,
        /// New position as X,Y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Point,
    },
    /// Drag a whole figure and rewrite the file
    Translate {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        figure: usize,
        /// Offset as DX,DY
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        by: Point,
    },
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    let p = Point::new(x, y);
    if !p.is_finite() {
        return Err(format!("'{}' is not a finite point", s));
    }
    Ok(p)
}

/// A file argument is read as a path file; anything else is path data.
fn read_input(input: &str) -> Result<PathDocument, LoadError> {
    let file = std::path::Path::new(input);
    if file.is_file() {
        PathDocument::load(file)
    } else {
        Ok(PathDocument::new(input, Style::default()))
    }
}

fn open_session(file: &std::path::Path) -> EditSession {
    match EditSession::open(file, OverlayOptions::default()) {
        Ok(session) => session,
        Err(LoadError::Parse(e)) => {
            eprintln!("Error parsing path data in '{}': {}", file.display(), e);
            process::exit(3);
        }
        Err(e) => {
            eprintln!("Error reading '{}': {}", file.display(), e);
            process::exit(2);
        }
    }
}

fn save_session(session: &mut EditSession, file: &std::path::Path) {
    if let Err(e) = session.save(file) {
        eprintln!("Error writing '{}': {}", file.display(), e);
        process::exit(4);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Show { input } => {
            let doc = load_document(&input);
            let path = parse_document(&doc);
            let overlay = build_overlay(&path, &OverlayOptions::default());

            println!("{}", path);
            for (i, figure) in path.figures.iter().enumerate() {
                let kinds: Vec<String> =
                    figure.segments.iter().map(|s| s.kind().to_string()).collect();
                println!(
                    "figure {}: start {}, {} segment(s) [{}]{}",
                    i,
                    figure.start,
                    figure.segments.len(),
                    kinds.join(", "),
                    if figure.closed { ", closed" } else { "" }
                );
            }
            for h in overlay.handles() {
                if let Some(p) = path.point(h.target) {
                    println!("  handle {} at {} -> {}", h.id, h.target, p);
                }
            }
            for line in overlay.lines() {
                println!(
                    "  line {} -> {}: {} -> {}",
                    line.anchor, line.free, line.from, line.to
                );
            }
            match path_maker::bounds(&path, doc.style.stroke_thickness) {
                Some(r) => println!(
                    "bounds: ({}, {}) - ({}, {})",
                    r.x0, r.y0, r.x1, r.y1
                ),
                None => println!("bounds: empty"),
            }
        }
        Command::Normalize { input } => {
            let doc = load_document(&input);
            println!("{}", parse_document(&doc));
        }
        Command::Save {
            input,
            output,
            stroke,
            fill,
            thickness,
        } => {
            let mut doc = load_document(&input);
            let path = parse_document(&doc);
            doc.data = path.to_string();
            if let Some(stroke) = stroke {
                doc.style.stroke = stroke;
            }
            if let Some(fill) = fill {
                doc.style.fill = fill;
            }
            if let Some(thickness) = thickness {
                doc.style.stroke_thickness = thickness;
            }

            match doc.save(&output) {
                Ok(()) => println!("Saved '{}'", output.display()),
                Err(e) => {
                    eprintln!("Error writing '{}': {}", output.display(), e);
                    process::exit(4);
                }
            }
        }
        Command::Move { file, handle, to } => {
            let mut session = open_session(&file);
            if let Err(e) = session.apply_drag(HandleId(handle), to) {
                eprintln!("Error: {}", e);
                process::exit(5);
            }
            let text = session.commit_drag();
            save_session(&mut session, &file);
            println!("{}", text);
        }
        Command::Translate { file, figure, by } => {
            let mut session = open_session(&file);
            if let Err(e) = session.drag_figure(figure, by.x, by.y) {
                eprintln!("Error: {}", e);
                process::exit(5);
            }
            let text = session.commit_drag();
            save_session(&mut session, &file);
            println!("{}", text);
        }
    }
}

fn load_document(input: &str) -> PathDocument {
    match read_input(input) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error reading input '{}': {}", input, e);
            process::exit(2);
        }
    }
}

fn parse_document(doc: &PathDocument) -> path_maker::Path {
    match path_maker::parse(&doc.data) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error parsing path data: {}", e);
            process::exit(3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("3,-4.5"), Ok(Point::new(3.0, -4.5)));
        assert!(parse_point("3").is_err());
        assert!(parse_point("NaN,0").is_err());
        assert!(parse_point("1,inf").is_err());
    }
}
