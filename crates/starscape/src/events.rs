//! Window event handling: resize, scroll input, redraw.

use winit::event::{MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::ViewerState;

impl ViewerState {
    /// Handle window events. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => true,
            WindowEvent::Resized(size) => {
                self.viewport.resize(size.width, size.height);
                if size.height > 0 {
                    self.page.set_viewport_height(size.height as f32);
                    self.sync_scroll();
                }
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Wheel up (positive y) moves back up the page.
                match delta {
                    MouseScrollDelta::LineDelta(_, y) => self.page.scroll_lines(-y),
                    MouseScrollDelta::PixelDelta(pos) => self.page.scroll_by(-pos.y as f32),
                }
                self.sync_scroll();
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() {
                    return false;
                }
                if let PhysicalKey::Code(key) = event.physical_key {
                    match key {
                        KeyCode::Escape => return true,
                        KeyCode::PageDown | KeyCode::Space => self.page.page_down(),
                        KeyCode::PageUp => self.page.page_up(),
                        KeyCode::Home => self.page.home(),
                        KeyCode::End => self.page.end(),
                        KeyCode::ArrowDown => self.page.scroll_lines(1.0),
                        KeyCode::ArrowUp => self.page.scroll_lines(-1.0),
                        _ => return false,
                    }
                    self.sync_scroll();
                }
                false
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.viewport.frame() {
                    log::error!("Render error: {}", e);
                    if e.is_fatal() {
                        return true;
                    }
                }
                if self.viewport.frame_loop().is_running() {
                    self.window.request_redraw();
                }
                false
            }
            _ => false,
        }
    }
}
