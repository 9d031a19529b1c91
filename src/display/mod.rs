mod font;
mod pixel_buffer;

pub use font::{draw_text, draw_text_scaled, GLYPH_HEIGHT};
pub use pixel_buffer::PixelBuffer;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::{EventPump, JoystickSubsystem};

/// 8-bit (r, g, b)
pub type Rgb = (u8, u8, u8);

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    joystick: JoystickSubsystem,
    width: u32,
    height: u32,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    KeyUp(Keycode),
    /// Vertical wheel notches, positive away from the user
    Wheel(i32),
    JoystickAdded,
    JoystickRemoved(u32),
}

impl Display {
    /// Open the exhibit window.
    ///
    /// Fullscreen takes the desktop resolution and ignores `size`; windowed
    /// opens a centered window of `size`.
    pub fn create(
        title: &str,
        fullscreen: bool,
        size: (u32, u32),
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let joystick = sdl_context.joystick()?;

        let (width, height) = if fullscreen {
            let mode = video_subsystem.desktop_display_mode(0)?;
            (mode.w as u32, mode.h as u32)
        } else {
            size
        };

        let mut builder = video_subsystem.window(title, width, height);
        if fullscreen {
            builder.fullscreen_desktop();
            sdl_context.mouse().show_cursor(false);
        } else {
            builder.position_centered();
        }
        let window = builder.build().map_err(|e| e.to_string())?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((
            Self {
                canvas,
                event_pump,
                joystick,
                width,
                height,
            },
            texture_creator,
        ))
    }

    /// Window size in pixels; the desktop size when fullscreen
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn joystick_subsystem(&self) -> &JoystickSubsystem {
        &self.joystick
    }

    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) -> Result<(), String> {
        target
            .texture
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k),
                    repeat: false,
                    ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::KeyUp {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyUp(k)),
                Event::MouseWheel { y, .. } if y != 0 => events.push(InputEvent::Wheel(y)),
                Event::JoyDeviceAdded { .. } => events.push(InputEvent::JoystickAdded),
                Event::JoyDeviceRemoved { which, .. } => {
                    events.push(InputEvent::JoystickRemoved(which));
                },
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self { texture })
    }
}
