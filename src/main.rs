// main.rs — 窗口、菜单、状态栏与点击回中视口

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod renderer;

use renderer::Renderer;
use streetview_viewer::config::{AppConfig, Cli};
use streetview_viewer::graticule::{build_graticule, GraticuleSettings, LineKind};
use streetview_viewer::i18n::{self, tr, tr_with};
use streetview_viewer::overlay::{crosshair_segments, export_overlay, OverlayStyle};
use streetview_viewer::panorama::{ClickTrace, PanoramaViewer};
use streetview_viewer::projector::{PixelCoordinate, Projector};
use streetview_viewer::tile::StreetViewSource;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

/// Room around the viewport for the menu and status bars.
const CHROME_MARGIN: (u32, u32) = (32, 96);

struct AppState {
    viewer: PanoramaViewer<StreetViewSource>,
    graticule: GraticuleSettings,
    style: OverlayStyle,
    last_trace: Rc<RefCell<Option<ClickTrace>>>,
    show_trace: bool,
    is_fullscreen: bool,
    current_lang: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = AppConfig::load(&cli)?;
    i18n::init(config.lang.clone());

    let viewport = config.viewport_config()?;
    let projector = Projector::new(viewport);
    let source = StreetViewSource::new(config.endpoint.clone(), config.api_key.clone());

    let last_trace = Rc::new(RefCell::new(None));
    let sink = last_trace.clone();
    let mut viewer = PanoramaViewer::new(projector, config.location, config.start, source)
        .with_trace_hook(move |trace: &ClickTrace| {
            log::debug!(
                "center was ({:.2}, {:.2}) at heading {:.4}, pitch {:.4}",
                trace.previous_center.u,
                trace.previous_center.v,
                trace.previous.heading,
                trace.previous.pitch
            );
            log::debug!(
                "click ({}, {}) reprojects to ({:.4}, {:.4})",
                trace.click.u,
                trace.click.v,
                trace.reprojected.u,
                trace.reprojected.v
            );
            *sink.borrow_mut() = Some(*trace);
        });

    if let Err(e) = viewer.refresh() {
        log::error!("{}", tr_with("error.tile", &[("err", e.to_string())]));
    }

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(tr("app.title"))
            .with_inner_size(LogicalSize::new(
                viewport.width() + CHROME_MARGIN.0,
                viewport.height() + CHROME_MARGIN.1,
            ))
            .build(&event_loop)?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;

    let mut state = AppState {
        viewer,
        graticule: config.graticule,
        style: OverlayStyle::default(),
        last_trace,
        show_trace: false,
        is_fullscreen: false,
        current_lang: i18n::current_lang(),
    };

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.repaint {
                    window.request_redraw();
                }
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::R) => reset_view(&mut state),
                                Some(VirtualKeyCode::G) => {
                                    state.graticule.enabled = !state.graticule.enabled;
                                }
                                Some(VirtualKeyCode::F11) => toggle_fullscreen(&mut state, &window),
                                _ => {}
                            }
                            window.request_redraw();
                        }
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                let render_result = renderer.render_ui(&window, |ctx| {
                    draw_ui(ctx, &mut state, &window);
                });

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {:?}", e),
                }
            }

            _ => {}
        }
    });
}

fn reset_view(state: &mut AppState) {
    if let Err(e) = state.viewer.reset() {
        log::error!("{}", tr_with("error.tile", &[("err", e.to_string())]));
    }
    *state.last_trace.borrow_mut() = None;
}

fn toggle_fullscreen(state: &mut AppState, window: &winit::window::Window) {
    state.is_fullscreen = !state.is_fullscreen;
    if state.is_fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

fn export_overlay_dialog(state: &AppState) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter(&tr("file.filter.png"), &["png"])
        .set_file_name("overlay.png")
        .save_file()
    else {
        return;
    };

    let projector = state.viewer.projector();
    let config = projector.config();
    let lines = build_graticule(projector, state.viewer.orientation(), &state.graticule);
    match export_overlay(&path, config.width(), config.height(), &lines, &state.style) {
        Ok(()) => log::info!(
            "{}",
            tr_with("log.export_saved", &[("path", path.display().to_string())])
        ),
        Err(e) => log::error!("{}", tr_with("error.export", &[("err", e.to_string())])),
    }
}

fn to_color(c: image::Rgba<u8>) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

fn draw_viewport(ui: &mut egui::Ui, state: &mut AppState) {
    let projector = *state.viewer.projector();
    let config = projector.config();
    let size = egui::vec2(config.width() as f32, config.height() as f32);

    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, to_color(state.style.background));

    let to_screen =
        |p: PixelCoordinate| egui::pos2(rect.min.x + p.u as f32, rect.min.y + p.v as f32);

    for line in build_graticule(&projector, state.viewer.orientation(), &state.graticule) {
        let width = match line.kind {
            LineKind::Parallel(p) if p == 0.0 => 1.5,
            _ => 1.0,
        };
        let points: Vec<egui::Pos2> = line.points.iter().copied().map(to_screen).collect();
        painter.add(egui::Shape::line(
            points,
            egui::Stroke::new(width, to_color(state.style.line_color(line.kind))),
        ));
    }

    for seg in crosshair_segments(config.width(), config.height()) {
        painter.line_segment(
            [to_screen(seg.from), to_screen(seg.to)],
            egui::Stroke::new(1.0, to_color(state.style.crosshair)),
        );
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let click = PixelCoordinate::new(
                (pos.x - rect.min.x) as f64,
                (pos.y - rect.min.y) as f64,
            );
            if let Err(e) = state.viewer.click(click) {
                log::warn!("{}", tr_with("error.click", &[("err", e.to_string())]));
            }
        }
    }

    response.on_hover_text(tr("viewport.hint"));
}

fn draw_ui(ctx: &egui::Context, state: &mut AppState, window: &winit::window::Window) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.export_overlay")).clicked() {
                    ui.close_menu();
                    export_overlay_dialog(state);
                }
                let url = state.viewer.tiles().last_url().map(str::to_owned);
                if ui
                    .add_enabled(url.is_some(), egui::Button::new(tr("menu.copy_url")))
                    .clicked()
                {
                    if let Some(url) = url {
                        ui.output_mut(|o| o.copied_text = url);
                    }
                    ui.close_menu();
                }
                if ui.button(tr("menu.exit")).clicked() {
                    std::process::exit(0);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                if ui.button(tr("view.reset")).clicked() {
                    reset_view(state);
                    ui.close_menu();
                }
                let fullscreen_label = if state.is_fullscreen {
                    tr("view.fullscreen.exit")
                } else {
                    tr("view.fullscreen.enter")
                };
                if ui.button(fullscreen_label).clicked() {
                    toggle_fullscreen(state, window);
                    ui.close_menu();
                }
                ui.separator();
                ui.checkbox(&mut state.graticule.enabled, tr("view.graticule"));
                ui.checkbox(&mut state.show_trace, tr("view.click_trace"));
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in i18n::LANGUAGES {
                    if ui
                        .radio_value(&mut state.current_lang, code.to_string(), name)
                        .clicked()
                    {
                        i18n::init(state.current_lang.clone());
                        window.set_title(&tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        let orientation = state.viewer.orientation();
        let projector = state.viewer.projector();
        let fov = projector.config().fov_degrees();

        ui.horizontal(|ui| {
            ui.label(format!("{} {:.2}°", tr("status.heading"), orientation.heading));
            ui.label("|");
            ui.label(format!("{} {:.2}°", tr("status.pitch"), orientation.pitch));
            ui.label("|");
            ui.label(format!("FOV: {:.1}°", fov));
            ui.label("|");
            ui.label(format!("f: {:.1}px", projector.focal_length()));
            ui.label("|");

            // 35mm 全画幅对角线
            let full_frame_diag = (36.0f64 * 36.0 + 24.0 * 24.0).sqrt();
            let equiv_focal = full_frame_diag / (2.0 * (fov.to_radians() * 0.5).tan());
            ui.label(format!(
                "{} {:.1}mm",
                tr("status.equiv_focal_prefix"),
                equiv_focal
            ));
            ui.label("|");
            ui.label(format!("{} {}", tr("status.location"), state.viewer.location()));
        });

        match state.viewer.tiles().last_url() {
            Some(url) => ui.label(egui::RichText::new(url).small().monospace()),
            None => ui.label(egui::RichText::new(tr("status.no_tile")).color(egui::Color32::YELLOW)),
        };

        if state.show_trace {
            if let Some(t) = *state.last_trace.borrow() {
                ui.label(
                    egui::RichText::new(tr_with(
                        "status.trace",
                        &[
                            ("u", format!("{:.1}", t.click.u)),
                            ("v", format!("{:.1}", t.click.v)),
                            ("ru", format!("{:.4}", t.reprojected.u)),
                            ("rv", format!("{:.4}", t.reprojected.v)),
                        ],
                    ))
                    .color(egui::Color32::GREEN),
                );
            }
        }
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.centered_and_justified(|ui| draw_viewport(ui, state));
    });
}
