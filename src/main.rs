// Allow unused code for designed-but-not-yet-used APIs
// Remove these as the codebase matures
#![allow(dead_code)]

mod camera;
mod cloud;
mod display;
mod math3d;
mod noise;
mod renderer;
mod settings;
mod util;

use display::{Display, InputEvent, PixelBuffer, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use renderer::CloudRenderer;
use sdl2::keyboard::Keycode;
use settings::CloudSettings;
use util::FpsCounter;

const SETTINGS_PATH: &str = "cloud.json";

/// Parse command line arguments and return (width, height, vsync)
fn parse_args() -> (u32, u32, bool) {
    let args: Vec<String> = std::env::args().collect();
    let mut width = DEFAULT_WIDTH;
    let mut height = DEFAULT_HEIGHT;
    let mut vsync = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => vsync = false,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        height = h;
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // Parse WxH format (e.g., 1280x720)
                    let parts: Vec<&str> = args[i + 1].split('x').collect();
                    if parts.len() == 2 {
                        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                            width = w;
                            height = h;
                        }
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: cloudbox [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  --width W, -w W       Set window width (default: {})",
                    DEFAULT_WIDTH
                );
                println!(
                    "  --height H, -h H      Set window height (default: {})",
                    DEFAULT_HEIGHT
                );
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1280x720)");
                println!("  --no-vsync            Disable VSync for uncapped framerate");
                println!("  --help                Show this help message");
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }

    (width, height, vsync)
}

fn print_params(settings: &CloudSettings) {
    println!(
        "steps={} density_scale={:.2} density_power={:.2} noise_scale={:.2}",
        settings.steps, settings.density_scale, settings.density_power, settings.noise_scale
    );
}

fn main() -> Result<(), String> {
    let (width, height, vsync) = parse_args();

    let (mut display, texture_creator) = Display::with_options("cloudbox", width, height, vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut buffer = PixelBuffer::with_size(width, height);

    // FPS counter with 60 sample rolling average
    let mut fps_counter = FpsCounter::new(60);
    let mut show_fps = false;

    // Load tuned settings or fall back to defaults
    let settings = CloudSettings::load(SETTINGS_PATH).unwrap_or_default();
    let mut renderer = CloudRenderer::new(settings);

    println!("=== cloudbox ===");
    println!("Resolution: {}x{}", width, height);
    if vsync {
        println!("VSync: ON (60fps locked). Use --no-vsync for uncapped.");
    } else {
        println!("VSync: OFF (uncapped framerate)");
    }
    println!("Use --help for command line options.");
    println!("Controls:");
    println!("  Up/Down    - Density scale");
    println!("  Left/Right - Raymarch steps");
    println!("  [ / ]      - Density power");
    println!("  , / .      - Noise scale");
    println!("  Space      - Pause/resume animation");
    println!("  f          - Toggle FPS readout");
    println!("  s / l      - Save / load {}", SETTINGS_PATH);
    println!("  Escape     - Quit");
    print_params(&renderer.settings);

    let mut paused = false;
    let mut running = true;
    let mut frame: u64 = 0;
    while running {
        let (dt, _, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => running = false,
                InputEvent::KeyDown(key) => {
                    handle_key(key, &mut renderer, &mut show_fps, &mut paused);
                },
                _ => {},
            }
        }

        if !paused {
            renderer.update(dt);
        }
        renderer.render(&mut buffer);
        display.present(&mut target, &buffer)?;

        frame += 1;
        if show_fps && frame % 60 == 0 {
            println!(
                "FPS: {:.1} ({:.2} ms/frame)",
                avg_fps,
                fps_counter.avg_frame_time_ms()
            );
        }
    }

    Ok(())
}

fn handle_key(key: Keycode, renderer: &mut CloudRenderer, show_fps: &mut bool, paused: &mut bool) {
    match key {
        Keycode::Up => {
            renderer.settings.density_scale = (renderer.settings.density_scale + 0.25).min(20.0);
            print_params(&renderer.settings);
        },
        Keycode::Down => {
            renderer.settings.density_scale = (renderer.settings.density_scale - 0.25).max(0.25);
            print_params(&renderer.settings);
        },
        Keycode::Right => {
            renderer.settings.steps = (renderer.settings.steps + 16).min(512);
            print_params(&renderer.settings);
        },
        Keycode::Left => {
            renderer.settings.steps = renderer.settings.steps.saturating_sub(16).max(16);
            print_params(&renderer.settings);
        },
        Keycode::RightBracket => {
            renderer.settings.density_power = (renderer.settings.density_power + 0.25).min(8.0);
            print_params(&renderer.settings);
        },
        Keycode::LeftBracket => {
            renderer.settings.density_power = (renderer.settings.density_power - 0.25).max(0.25);
            print_params(&renderer.settings);
        },
        Keycode::Period => {
            renderer.settings.noise_scale = (renderer.settings.noise_scale * 1.25).min(16.0);
            print_params(&renderer.settings);
        },
        Keycode::Comma => {
            renderer.settings.noise_scale = (renderer.settings.noise_scale / 1.25).max(0.125);
            print_params(&renderer.settings);
        },
        Keycode::Space => {
            *paused = !*paused;
            println!("Animation {}", if *paused { "paused" } else { "running" });
        },
        Keycode::F => {
            *show_fps = !*show_fps;
        },
        Keycode::S => match renderer.settings.save(SETTINGS_PATH) {
            Ok(()) => println!("Saved settings to {}", SETTINGS_PATH),
            Err(e) => println!("Save failed: {}", e),
        },
        Keycode::L => match CloudSettings::load(SETTINGS_PATH) {
            Ok(loaded) => {
                renderer.settings = loaded;
                println!("Loaded settings from {}", SETTINGS_PATH);
                print_params(&renderer.settings);
            },
            Err(e) => println!("Load failed: {}", e),
        },
        _ => {},
    }
}
