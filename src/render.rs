use anyhow::Result;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::f32::consts::TAU;
use std::io::{self, Write};

use crate::particles::ParticleField;
use crate::visual::{Rgb, VisualParams, WHITE};

// Braille: each terminal cell is 2x4 subpixels.
const SUB_X: usize = 2;
const SUB_Y: usize = 4;

// Where the mean waterline sits, in normalized scene coordinates.
pub(crate) const SURFACE_Y: f32 = 0.34;

const SKY_TOP: Rgb = Rgb::new(215, 237, 247);
const SKY_HORIZON: Rgb = Rgb::new(150, 210, 235);

const BRAILLE_THRESHOLD: u8 = 38;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    fn new(w: u16, h: u16, bg: Color) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::blank(bg); (w as usize) * (h as usize)],
        }
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

/// Subpixel canvas: intensity plus the color of whatever drew brightest.
pub(crate) struct Canvas {
    pub(crate) sw: usize,
    pub(crate) sh: usize,
    lum: Vec<u8>,
    col: Vec<Rgb>,
}

impl Canvas {
    fn new(term_w: usize, term_h: usize) -> Self {
        let sw = term_w * SUB_X;
        let sh = term_h * SUB_Y;
        Self {
            sw,
            sh,
            lum: vec![0; sw * sh],
            col: vec![Rgb::new(0, 0, 0); sw * sh],
        }
    }

    fn clear(&mut self) {
        self.lum.fill(0);
    }

    fn sidx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.sw || y >= self.sh {
            return None;
        }
        Some(y * self.sw + x)
    }

    pub(crate) fn plot(&mut self, x: i32, y: i32, v: u8, c: Rgb) {
        if let Some(i) = self.sidx(x, y) {
            if v > self.lum[i] {
                self.lum[i] = v;
                self.col[i] = c;
            }
        }
    }

    pub(crate) fn disc(&mut self, cx: f32, cy: f32, r: f32, strength: u8, c: Rgb) {
        // floor keeps sub-subpixel particles from vanishing on small terminals
        let rs = (r * (self.sw.min(self.sh) as f32)).max(0.7);
        let cxs = cx * self.sw as f32;
        let cys = cy * self.sh as f32;

        let minx = (cxs - rs) as i32 - 1;
        let maxx = (cxs + rs) as i32 + 1;
        let miny = (cys - rs) as i32 - 1;
        let maxy = (cys + rs) as i32 + 1;

        for y in miny..=maxy {
            for x in minx..=maxx {
                let dx = x as f32 + 0.5 - cxs;
                let dy = y as f32 + 0.5 - cys;
                let d = (dx * dx + dy * dy).sqrt();
                if d <= rs {
                    let fall = 1.0 - (d / rs.max(1e-6)).clamp(0.0, 1.0);
                    let v = (strength as f32 * (0.35 + 0.65 * fall)) as u8;
                    self.plot(x, y, v, c);
                }
            }
        }
    }

    pub(crate) fn tri(
        &mut self,
        a: (f32, f32),
        b: (f32, f32),
        c: (f32, f32),
        strength: u8,
        col: Rgb,
    ) {
        let (ax, ay) = (a.0 * self.sw as f32, a.1 * self.sh as f32);
        let (bx, by) = (b.0 * self.sw as f32, b.1 * self.sh as f32);
        let (cx, cy) = (c.0 * self.sw as f32, c.1 * self.sh as f32);

        let area = (bx - ax) * (cy - ay) - (by - ay) * (cx - ax);
        if area.abs() < 1e-6 {
            return;
        }

        let minx = ax.min(bx).min(cx).floor() as i32;
        let maxx = ax.max(bx).max(cx).ceil() as i32;
        let miny = ay.min(by).min(cy).floor() as i32;
        let maxy = ay.max(by).max(cy).ceil() as i32;

        for y in miny..=maxy {
            for x in minx..=maxx {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let w0 = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
                let w1 = (cx - bx) * (py - by) - (cy - by) * (px - bx);
                let w2 = (ax - cx) * (py - cy) - (ay - cy) * (px - cx);
                let inside = if area > 0.0 {
                    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
                } else {
                    w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
                };
                if inside {
                    self.plot(x, y, strength, col);
                }
            }
        }
    }

    /// Braille mask plus the color of the brightest lit subpixel.
    fn cell(&self, tx: usize, ty: usize, threshold: u8) -> (u8, Rgb) {
        let sx0 = tx * SUB_X;
        let sy0 = ty * SUB_Y;

        let mut mask = 0u8;
        let mut best = 0u8;
        let mut best_col = Rgb::new(0, 0, 0);

        for oy in 0..SUB_Y {
            for ox in 0..SUB_X {
                let i = (sy0 + oy) * self.sw + (sx0 + ox);
                let v = self.lum[i];
                if v >= threshold {
                    mask |= braille_bit(ox, oy);
                }
                if v > best {
                    best = v;
                    best_col = self.col[i];
                }
            }
        }
        (mask, best_col)
    }
}

fn braille_bit(dx: usize, dy: usize) -> u8 {
    // Unicode braille dot numbering:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

fn braille_char(mask: u8) -> char {
    char::from_u32(0x2800 + mask as u32).unwrap_or(' ')
}

fn color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: Canvas,
    full_redraw: bool,
}

impl Terminal {
    pub(crate) fn begin() -> Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let cols = cols.max(2);
        let rows = rows.max(2);
        let bg = Color::Reset;

        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows, bg),
            cur: CellBuffer::new(cols, rows, bg),
            canvas: Canvas::new(cols as usize, rows as usize),
            full_redraw: true,
        })
    }

    pub(crate) fn end(&mut self) -> Result<()> {
        queue!(
            self.out,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> Result<bool> {
        let (c, r) = terminal::size()?;
        let c = c.max(2);
        let r = r.max(2);
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r, Color::Reset);
        self.cur = CellBuffer::new(c, r, Color::Reset);
        self.canvas = Canvas::new(c as usize, r as usize);
        self.full_redraw = true;
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if !self.full_redraw && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        self.full_redraw = false;
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

pub(crate) fn draw_scene(term: &mut Terminal, params: &VisualParams, field: &ParticleField) {
    term.canvas.clear();

    draw_waves(&mut term.canvas, params);
    draw_coral(&mut term.canvas, params);
    draw_plankton(&mut term.canvas, field, params.plankton_alpha);
    draw_bubbles(&mut term.canvas, field);

    compose(term, params);
}

fn draw_waves(canvas: &mut Canvas, params: &VisualParams) {
    let sw = canvas.sw as i32;
    for layer in &params.layers {
        let crest_col = layer.color.lerp(WHITE, 0.6);
        let crest_v = layer.alpha.saturating_add(40);

        for sx in 0..sw {
            let xn = (sx as f32 + 0.5) / canvas.sw as f32;
            let yn = SURFACE_Y
                + layer.offset_y
                + (xn * TAU * layer.frequency + layer.phase).sin() * layer.amplitude;
            let sy = (yn * canvas.sh as f32) as i32;

            canvas.plot(sx, sy - 1, crest_v, crest_col);
            canvas.plot(sx, sy, crest_v, crest_col);

            // body band fading below the crest
            for d in 1..=10i32 {
                let fade = 1.0 - d as f32 / 11.0;
                canvas.plot(sx, sy + d, (layer.alpha as f32 * fade) as u8, layer.color);
            }
        }
    }
}

fn draw_coral(canvas: &mut Canvas, params: &VisualParams) {
    let cx = 0.5;
    let cy = 0.94;
    let health = params.coral_health;

    // a small fan of fronds; healthier coral reaches higher
    for i in 0..5 {
        let fi = i as f32;
        let a = (cx - 0.055 + fi * 0.022, cy);
        let b = (cx + fi * 0.014, cy - 0.085 - fi * 0.018 * health);
        let c = (cx + 0.055 - fi * 0.014, cy);
        canvas.tri(a, b, c, 185, params.coral_color);
    }
}

fn draw_plankton(canvas: &mut Canvas, field: &ParticleField, alpha: u8) {
    let glow_col = Rgb::new(235, 255, 245);
    for p in &field.plankton {
        for ring in 0..3u8 {
            let v = alpha / (ring + 2);
            let r = p.size * (1.0 + ring as f32 * 0.7);
            canvas.disc(p.x, p.y, r, v, glow_col);
        }
    }
}

fn draw_bubbles(canvas: &mut Canvas, field: &ParticleField) {
    let bubble_col = Rgb::new(225, 240, 250);
    for b in &field.bubbles {
        canvas.disc(b.x, b.y, b.size, b.alpha, bubble_col);
        // highlight
        canvas.disc(
            b.x - b.size * 0.35,
            b.y - b.size * 0.35,
            b.size * 0.35,
            b.alpha.saturating_add(60),
            WHITE,
        );
    }
}

fn background_color(yn: f32, params: &VisualParams) -> Rgb {
    if yn < SURFACE_Y {
        SKY_TOP.lerp(SKY_HORIZON, yn / SURFACE_Y)
    } else {
        let t = (yn - SURFACE_Y) / (1.0 - SURFACE_Y);
        params.water_surface.lerp(params.water_deep, t)
    }
}

fn compose(term: &mut Terminal, params: &VisualParams) {
    let cols = term.cols;
    let rows = term.rows;

    for ty in 0..rows {
        let yn = (ty as f32 + 0.5) / rows as f32;
        let bg = color(background_color(yn, params));
        for tx in 0..cols {
            let (mask, fg) = term
                .canvas
                .cell(tx as usize, ty as usize, BRAILLE_THRESHOLD);
            let ch = if mask == 0 { ' ' } else { braille_char(mask) };
            term.cur.set(
                tx,
                ty,
                Cell {
                    ch,
                    fg: color(fg),
                    bg,
                },
            );
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    let mut cx = x;
    for ch in s.chars() {
        if cx >= buf.w {
            break;
        }
        buf.set(cx, y, Cell { ch, fg, bg });
        cx += 1;
    }
}

pub(crate) fn draw_hud(term: &mut Terminal, line1: &str, line2: &str) {
    let hud_fg = Color::Rgb {
        r: 186,
        g: 226,
        b: 240,
    };
    let hud_bg = Color::Rgb { r: 6, g: 20, b: 32 };

    for x in 0..term.cols {
        term.cur.set(
            x,
            0,
            Cell {
                ch: ' ',
                fg: hud_fg,
                bg: hud_bg,
            },
        );
        if term.rows > 1 {
            term.cur.set(
                x,
                1,
                Cell {
                    ch: ' ',
                    fg: hud_fg,
                    bg: hud_bg,
                },
            );
        }
    }
    draw_text(&mut term.cur, 0, 0, line1, hud_fg, hud_bg);
    if term.rows > 1 {
        draw_text(&mut term.cur, 0, 1, line2, hud_fg, hud_bg);
    }
}

pub(crate) fn draw_center_box(term: &mut Terminal, title: &str, lines: &[&str]) {
    let fg = Color::White;
    let bg = Color::Rgb { r: 4, g: 14, b: 24 };

    let w = term.cols as i32;
    let h = term.rows as i32;
    if w < 24 || h < 7 {
        return;
    }

    let content_w = lines.iter().map(|l| l.len()).max().unwrap_or(0).max(title.len()) as i32;
    let box_w = (content_w + 6).min(w - 2).max(20);
    let box_h = (lines.len() as i32 + 4).min(h - 2).max(5);

    let x0 = (w - box_w) / 2;
    let y0 = (h - box_h) / 2;

    for y in 0..box_h {
        for x in 0..box_w {
            let is_border = x == 0 || x == box_w - 1 || y == 0 || y == box_h - 1;
            let ch = if is_border {
                match (x == 0, x == box_w - 1, y == 0, y == box_h - 1) {
                    (true, _, true, _) => '┌',
                    (_, true, true, _) => '┐',
                    (true, _, _, true) => '└',
                    (_, true, _, true) => '┘',
                    (_, _, true, _) | (_, _, _, true) => '─',
                    _ => '│',
                }
            } else {
                ' '
            };
            term.cur.set((x0 + x) as u16, (y0 + y) as u16, Cell { ch, fg, bg });
        }
    }

    draw_text(&mut term.cur, (x0 + 2) as u16, (y0 + 1) as u16, title, fg, bg);
    let mut row = 3;
    for line in lines {
        if row >= box_h - 1 {
            break;
        }
        draw_text(&mut term.cur, (x0 + 2) as u16, (y0 + row) as u16, line, fg, bg);
        row += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_keeps_the_brightest_write() {
        let mut canvas = Canvas::new(4, 4);
        canvas.plot(1, 1, 100, Rgb::new(1, 2, 3));
        canvas.plot(1, 1, 50, Rgb::new(9, 9, 9));
        let (mask, col) = canvas.cell(0, 0, 60);
        assert_ne!(mask, 0);
        assert_eq!(col, Rgb::new(1, 2, 3));
    }

    #[test]
    fn cell_mask_is_empty_below_threshold() {
        let mut canvas = Canvas::new(4, 4);
        canvas.plot(0, 0, 10, Rgb::new(255, 255, 255));
        let (mask, _) = canvas.cell(0, 0, 38);
        assert_eq!(mask, 0);
    }

    #[test]
    fn triangle_fill_lights_the_interior() {
        let mut canvas = Canvas::new(10, 10);
        canvas.tri((0.1, 0.9), (0.5, 0.1), (0.9, 0.9), 200, Rgb::new(250, 160, 120));
        let lit = canvas.lum.iter().filter(|&&v| v > 0).count();
        assert!(lit > 20, "only {lit} subpixels lit");
    }

    #[test]
    fn braille_mask_round_trips_to_a_glyph() {
        assert_eq!(braille_char(0x00), '\u{2800}');
        assert_eq!(braille_char(0xFF), '\u{28FF}');
    }

    #[test]
    fn background_darkens_with_depth() {
        let cfg = crate::config::ClimateConfig::exponential();
        let vis = crate::config::VisualConfig::default();
        let params = crate::visual::VisualParams::derive(&cfg, &vis, 8.0, 0.0);
        let shallow = background_color(SURFACE_Y + 0.05, &params);
        let deep = background_color(0.99, &params);
        let brightness = |c: Rgb| c.r as u32 + c.g as u32 + c.b as u32;
        assert!(brightness(deep) < brightness(shallow));
    }
}
