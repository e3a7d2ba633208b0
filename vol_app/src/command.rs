//! Text commands read from stdin, one per line

use std::path::PathBuf;

use volume_tf::pipeline::Command;

use crate::defaults;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Forwarded to the pipeline context
    Pipeline(Command),
    /// Orbit, degrees
    Rotate { d_phi: f32, d_theta: f32 },
    Zoom(f32),
    /// Render a frame, optionally into a given file
    Render(Option<PathBuf>),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  w | e            step size up | down
  H | h            hue high up | down
  L | l            hue low up | down
  v | space        cycle view (composite, back faces, front faces)
  lum <value>      set luminance
  rot [phi theta]  orbit camera, degrees
  zoom [delta]     move camera away (+) or closer (-)
  render [file]    render a frame to PNG
  status           print current settings
  q | quit         exit";

fn parse_f32(word: Option<&str>, default: f32) -> Result<f32, String> {
    match word {
        Some(w) => w
            .parse::<f32>()
            .map_err(|_| format!("Expected number, got '{w}'")),
        None => Ok(default),
    }
}

/// Parse one line. Empty lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<AppCommand>, String> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    // a lone space toggles the view
    if line == " " {
        return Ok(Some(AppCommand::Pipeline(Command::ToggleView)));
    }

    let mut words = line.split_whitespace();
    let head = match words.next() {
        Some(h) => h,
        None => return Ok(None),
    };

    let cmd = match head {
        "w" => AppCommand::Pipeline(Command::StepUp),
        "e" => AppCommand::Pipeline(Command::StepDown),
        "H" => AppCommand::Pipeline(Command::HueHighUp),
        "h" => AppCommand::Pipeline(Command::HueHighDown),
        "L" => AppCommand::Pipeline(Command::HueLowUp),
        "l" => AppCommand::Pipeline(Command::HueLowDown),
        "v" | "space" => AppCommand::Pipeline(Command::ToggleView),
        "lum" => {
            let value = words.next().ok_or("lum needs a value")?;
            AppCommand::Pipeline(Command::SetLuminance(parse_f32(Some(value), 0.0)?))
        }
        "rot" => {
            let d_phi = parse_f32(words.next(), defaults::ROTATE_STEP)?;
            let d_theta = parse_f32(words.next(), 0.0)?;
            AppCommand::Rotate { d_phi, d_theta }
        }
        "zoom" => AppCommand::Zoom(parse_f32(words.next(), defaults::ZOOM_STEP)?),
        "render" => AppCommand::Render(words.next().map(PathBuf::from)),
        "status" => AppCommand::Status,
        "?" | "help" => AppCommand::Help,
        "q" | "quit" | "exit" => AppCommand::Quit,
        other => return Err(format!("Unknown command '{other}', type ? for help")),
    };

    if words.next().is_some() {
        return Err(format!("Too many arguments for '{head}'"));
    }
    Ok(Some(cmd))
}
