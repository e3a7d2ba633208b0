//! Volume analysis viewer
//!
//! Loads a dataset, builds the transfer function and renders frames on
//! request. Commands are read from stdin, type `?` for a list:
//! `cargo run --release --bin vol_app -- volumes/skull.dat`

use std::io::{self, BufRead};

use nalgebra::point;
use volume_tf::{render::OrbitCamera, PipelineContext};

mod args;
mod command;
mod config;
mod defaults;
mod render_thread;

use crate::{
    args::get_command,
    command::{parse_line, AppCommand, HELP},
    config::Config,
    render_thread::{RenderThread, RenderThreadMessage},
};

/// Current settings and dataset statistics, one line each
fn status_lines(context: &PipelineContext, camera: &OrbitCamera) -> [String; 2] {
    let controls = context.controls();
    let hue = controls.hue_range();
    let stats = context.stats();
    let data = stats.data_range();
    let (window_low, window_high) = stats.intensity_window();
    [
        format!(
            "step {:.5} | hue {}..{} | luminance {} | view {:?} | camera radius {:.2}",
            controls.step_size(),
            hue.low,
            hue.high,
            controls.luminance(),
            controls.view(),
            camera.radius()
        ),
        format!(
            "data {}..={} | mean {:.3} | cv {:.3} | peak bin {} | window {:.4}..{:.4}",
            data.low,
            data.high,
            stats.mean,
            stats.cv,
            stats.max_frequency(),
            window_low,
            window_high
        ),
    ]
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = get_command().get_matches();
    let cfg = match Config::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    log::debug!("{:?}", cfg);

    let mut context = match PipelineContext::load(&cfg.header_path, cfg.options.clone()) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Loading dataset failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let render_thread = RenderThread::new(context.grid().clone(), context.transfer());
    let sender = render_thread.get_sender();
    let replies = render_thread.get_receiver();
    let handle = render_thread.start();

    let mut camera = OrbitCamera::new(point![0.5, 0.5, 0.5], defaults::CAM_RADIUS);
    let mut frame = 0;

    println!("{HELP}");
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("Reading stdin failed: {e}");
                break;
            }
        };

        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };

        match cmd {
            AppCommand::Quit => break,
            AppCommand::Help => println!("{HELP}"),
            AppCommand::Status => {
                for line in status_lines(&context, &camera) {
                    println!("{line}");
                }
            }
            AppCommand::Pipeline(c) => match context.apply(c) {
                Ok(true) => log::info!(
                    "Transfer function rebuilt, {:?}",
                    context.controls().hue_range()
                ),
                Ok(false) => (),
                Err(e) => {
                    log::error!("{e}");
                    eprintln!("Error: {e}");
                }
            },
            AppCommand::Rotate { d_phi, d_theta } => {
                camera.rotate(d_phi.to_radians(), d_theta.to_radians())
            }
            AppCommand::Zoom(delta) => camera.zoom(delta),
            AppCommand::Render(path) => {
                let path = path.unwrap_or_else(|| {
                    cfg.output_dir
                        .join(format!("{}_{frame:04}.png", defaults::FRAME_PREFIX))
                });
                frame += 1;

                let mut params = context.controls().render_params(cfg.resolution);
                params.shading = cfg.shading;
                let msg = RenderThreadMessage::Render {
                    camera: camera.clone(),
                    params,
                    path,
                };
                if sender.send(msg).is_err() {
                    log::error!("Render thread is gone");
                    break;
                }
                match replies.recv() {
                    Ok(Ok(saved)) => println!("Saved {}", saved.display()),
                    Ok(Err(e)) => {
                        log::error!("Render failed: {e}");
                        eprintln!("Error: {e}");
                    }
                    Err(_) => {
                        log::error!("Render thread is gone");
                        break;
                    }
                }
            }
        }
    }

    log::info!("Shutting down");
    let _ = sender.send(RenderThreadMessage::ShutDown);
    if handle.join().is_err() {
        log::error!("Render thread panicked");
    }
}
