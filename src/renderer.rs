use crate::assets::ImageHandle;
use crate::entities::{GameState, Rect};
use crate::game::Game;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Rect as Area},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const UPPER_HALF_BLOCK: &str = "▀";

/// Drawing surface in world coordinates. The game issues its draw calls
/// through this so it never needs to know what it is drawn on.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// One pixel outline along the edges of `rect`
    fn stroke_rect(&mut self, rect: Rect, color: Color);
    /// Draws `image` stretched over `rect`, flipped horizontally if
    /// `mirrored`. Mostly transparent pixels are skipped.
    fn blit(&mut self, image: &ImageHandle, rect: Rect, mirrored: bool);
    /// Text centred horizontally on `x`
    fn text(&mut self, x: f32, y: f32, text: &str, color: Color);
}

/// Canvas over a ratatui buffer. Each cell holds two vertically stacked
/// pixels drawn with an upper half block: the foreground colour is the top
/// pixel and the background colour the bottom one.
pub struct TerminalCanvas<'a> {
    buffer: &'a mut Buffer,
    area: Area,
    scale_x: f32,
    scale_y: f32,
}

impl<'a> TerminalCanvas<'a> {
    /// Maps a world of `world_width` x `world_height` units onto `area`.
    pub fn new(buffer: &'a mut Buffer, area: Area, world_width: f32, world_height: f32) -> Self {
        Self {
            buffer,
            area,
            scale_x: area.width as f32 / world_width.max(1.0),
            scale_y: area.height as f32 * 2.0 / world_height.max(1.0),
        }
    }

    fn pixel_width(&self) -> i32 {
        self.area.width as i32
    }

    fn pixel_height(&self) -> i32 {
        self.area.height as i32 * 2
    }

    /// Pixel span covered by `rect`, unclipped. Anything with a positive
    /// size covers at least one pixel.
    fn pixel_span(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let x0 = (rect.left() * self.scale_x).floor() as i32;
        let y0 = (rect.top() * self.scale_y).floor() as i32;
        let x1 = ((rect.right() * self.scale_x).ceil() as i32).max(x0 + 1);
        let y1 = ((rect.bottom() * self.scale_y).ceil() as i32).max(y0 + 1);
        (x0, y0, x1, y1)
    }

    fn set_pixel(&mut self, px: i32, py: i32, color: Color) {
        if px < 0 || py < 0 || px >= self.pixel_width() || py >= self.pixel_height() {
            return;
        }
        let x = self.area.x + px as u16;
        let y = self.area.y + (py / 2) as u16;
        let Some(cell) = self.buffer.cell_mut((x, y)) else {
            return;
        };

        if cell.symbol() != UPPER_HALF_BLOCK {
            cell.set_symbol(UPPER_HALF_BLOCK);
            cell.set_fg(Color::Reset);
            cell.set_bg(Color::Reset);
        }
        if py % 2 == 0 {
            cell.set_fg(color);
        } else {
            cell.set_bg(color);
        }
    }
}

impl Canvas for TerminalCanvas<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x0, y0, x1, y1) = self.pixel_span(rect);
        for py in y0.max(0)..y1.min(self.pixel_height()) {
            for px in x0.max(0)..x1.min(self.pixel_width()) {
                self.set_pixel(px, py, color);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        let (x0, y0, x1, y1) = self.pixel_span(rect);
        for px in x0..x1 {
            self.set_pixel(px, y0, color);
            self.set_pixel(px, y1 - 1, color);
        }
        for py in y0..y1 {
            self.set_pixel(x0, py, color);
            self.set_pixel(x1 - 1, py, color);
        }
    }

    fn blit(&mut self, image: &ImageHandle, rect: Rect, mirrored: bool) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let (x0, y0, x1, y1) = self.pixel_span(rect);
        let (span_w, span_h) = ((x1 - x0) as f32, (y1 - y0) as f32);

        for py in y0.max(0)..y1.min(self.pixel_height()) {
            let v = ((py - y0) as f32 / span_h * image.height() as f32) as u32;
            for px in x0.max(0)..x1.min(self.pixel_width()) {
                let mut u = ((px - x0) as f32 / span_w * image.width() as f32) as u32;
                if mirrored {
                    u = image.width() - 1 - u.min(image.width() - 1);
                }
                let [r, g, b, a] = image.pixel(u, v);
                if a >= 128 {
                    self.set_pixel(px, py, Color::Rgb(r, g, b));
                }
            }
        }
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Color) {
        let row = (y * self.scale_y / 2.0).floor() as i32;
        if row < 0 || row >= self.area.height as i32 {
            return;
        }
        let width = text.chars().count() as i32;
        let column = ((x * self.scale_x).floor() as i32 - width / 2).max(0);
        if column >= self.area.width as i32 {
            return;
        }

        self.buffer.set_stringn(
            self.area.x + column as u16,
            self.area.y + row as u16,
            text,
            (self.area.width as i32 - column) as usize,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
    }
}

/// Largest area with the world's aspect ratio that fits in `area`, centred.
/// Cells count as one pixel wide and two tall.
pub fn playfield_area(area: Area, world_width: f32, world_height: f32) -> Area {
    let scale = (area.width as f32 / world_width).min(area.height as f32 * 2.0 / world_height);
    let width = ((world_width * scale).floor() as u16).min(area.width);
    let height = ((world_height * scale / 2.0).floor() as u16).min(area.height);
    Area {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// View struct that holds all game state needed for rendering
pub struct RenderView<'a> {
    pub game: &'a Game,
    pub area: Area,
    pub fps: u32,
}

/// Handles all rendering responsibilities for the game
#[derive(Default)]
pub struct GameRenderer;

impl GameRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Main render method that dispatches to state-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.game.state() {
            GameState::Playing => self.render_game(frame, view),
            GameState::Paused => self.render_paused(frame, view),
            GameState::Complete => self.render_complete(frame, view),
        }
    }

    /// Renders the playfield between the HUD line and the controls hint
    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let config = view.game.config();

        let bordered = Area {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(bordered);
        frame.render_widget(block, bordered);

        let field = playfield_area(inner, config.screen_width, config.screen_height);
        let mut canvas = TerminalCanvas::new(
            frame.buffer_mut(),
            field,
            config.screen_width,
            config.screen_height,
        );
        view.game.render(&mut canvas);

        let hud = Line::from(vec![
            Span::styled("Level: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}/{}", view.game.level_id(), view.game.max_level_id()),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Deaths: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.game.player().deaths),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Enemies: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.game.enemies().len()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  FPS: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.fps),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        let hud_area = Area {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(hud), hud_area);

        // Controls hint at bottom
        let controls = Line::from(vec![Span::styled(
            "[A/D: Move] [W: Jump] [S: Crouch] [Space: Fire] [N: Skip] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);

        let controls_area = Area {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(1),
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(controls).centered(), controls_area);
    }

    /// Renders the pause screen with overlay
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let area = view.area;
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let pause_area = Area {
            x: area.x + area.width.saturating_sub(30) / 2,
            y: area.y + area.height.saturating_sub(6) / 2,
            width: area.width.min(30),
            height: area.height.min(6),
        };

        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }

    fn render_complete(&self, frame: &mut Frame, view: &RenderView) {
        let deaths = view.game.player().deaths;

        let complete_text = vec![
            Line::from(""),
            Line::from("╔═══════════════════════════╗").centered().green(),
            Line::from("║     ALL LEVELS CLEARED    ║")
                .centered()
                .green()
                .bold(),
            Line::from("╚═══════════════════════════╝").centered().green(),
            Line::from(""),
            Line::from(format!("Levels: {}", view.game.max_level_id()))
                .centered()
                .yellow()
                .bold(),
            Line::from(format!("Total deaths: {}", deaths))
                .centered()
                .red()
                .bold(),
            Line::from(""),
            Line::from("Press R to play again").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];

        frame.render_widget(
            Paragraph::new(complete_text)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            view.area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u16, height: u16) -> Buffer {
        Buffer::empty(Area::new(0, 0, width, height))
    }

    #[test]
    fn test_fill_rect_sets_both_half_cells() {
        let mut buf = buffer(10, 5);
        let area = buf.area;
        let mut canvas = TerminalCanvas::new(&mut buf, area, 10.0, 10.0);

        canvas.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::Red);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), UPPER_HALF_BLOCK);
        assert_eq!(cell.fg, Color::Red);
        assert_eq!(cell.bg, Color::Red);
        assert_eq!(buf[(2, 0)].symbol(), " ");
    }

    #[test]
    fn test_fill_rect_top_half_only() {
        let mut buf = buffer(10, 5);
        let area = buf.area;
        let mut canvas = TerminalCanvas::new(&mut buf, area, 10.0, 10.0);

        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::Blue);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.fg, Color::Blue);
        assert_eq!(cell.bg, Color::Reset);
    }

    #[test]
    fn test_drawing_outside_the_area_is_clipped() {
        let mut buf = buffer(4, 2);
        let area = buf.area;
        let mut canvas = TerminalCanvas::new(&mut buf, area, 4.0, 4.0);

        canvas.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), Color::Green);
        canvas.stroke_rect(Rect::new(2.0, 2.0, 50.0, 50.0), Color::Red);
        canvas.text(100.0, 100.0, "off screen", Color::White);

        assert_eq!(buf[(0, 0)].fg, Color::Green);
        assert_eq!(buf[(3, 1)].fg, Color::Red);
    }

    #[test]
    fn test_blit_mirrored_flips_columns() {
        let image = ImageHandle::new(image::RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        }));

        let mut buf = buffer(2, 1);
        let area = buf.area;
        let mut canvas = TerminalCanvas::new(&mut buf, area, 2.0, 2.0);
        canvas.blit(&image, Rect::new(0.0, 0.0, 2.0, 1.0), false);
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(1, 0)].fg, Color::Rgb(0, 0, 255));

        let mut buf = buffer(2, 1);
        let area = buf.area;
        let mut canvas = TerminalCanvas::new(&mut buf, area, 2.0, 2.0);
        canvas.blit(&image, Rect::new(0.0, 0.0, 2.0, 1.0), true);
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(0, 0, 255));
        assert_eq!(buf[(1, 0)].fg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_blit_skips_transparent_pixels() {
        let image = ImageHandle::solid(1, 1, [255, 255, 255, 0]);
        let mut buf = buffer(1, 1);
        let area = buf.area;
        let mut canvas = TerminalCanvas::new(&mut buf, area, 1.0, 2.0);

        canvas.blit(&image, Rect::new(0.0, 0.0, 1.0, 2.0), false);
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn test_playfield_area_keeps_aspect_ratio() {
        let field = playfield_area(Area::new(0, 0, 120, 40), 960.0, 640.0);
        assert_eq!(field.width, 120);
        assert_eq!(field.height, 40);

        let field = playfield_area(Area::new(0, 0, 200, 40), 960.0, 640.0);
        assert_eq!((field.width, field.height), (120, 40));
        assert_eq!(field.x, 40);
    }
}
