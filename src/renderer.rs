//! Software back end: executes the compositor's draw list
//!
//! The engine core only emits draw commands; this module is the built-in
//! rendering collaborator. Textures are not decoded here, so a texture id
//! maps to a base material color, the texel column picks a subtle stripe
//! phase, and the shade factor darkens with distance. Commands arrive in
//! painter's order, so plain overdraw is correct.

use crate::composite::DrawCommand;
use crate::level::{BOUNDARY_WALL, WallId};
use crate::project::ScreenRect;

#[inline]
fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

/// Scale a packed color by shade/255 per channel.
#[inline]
fn apply_shade(color: u32, shade: u8) -> u32 {
    let s = shade as u32;
    let b = (color & 0xFF) * s / 255;
    let g = ((color >> 8) & 0xFF) * s / 255;
    let r = ((color >> 16) & 0xFF) * s / 255;
    (r << 16) | (g << 8) | b
}

/// Base color for a wall material id.
fn wall_color(id: WallId) -> u32 {
    match id {
        BOUNDARY_WALL => pack_rgb(70, 70, 80),
        1 => pack_rgb(200, 200, 200),
        2 => pack_rgb(180, 180, 250),
        3 => pack_rgb(250, 180, 180),
        _ => pack_rgb(180, 250, 180),
    }
}

/// Base color for a sprite texture id.
fn sprite_color(id: u16) -> u32 {
    match id {
        1 => pack_rgb(200, 60, 60),
        _ => pack_rgb(220, 160, 40),
    }
}

/// Clip a rect against the framebuffer and fill it.
fn fill_rect(buf: &mut [u32], width: usize, height: usize, rect: ScreenRect, color: u32) {
    let x0 = rect.x.max(0) as usize;
    let y0 = rect.y.max(0) as usize;
    let x1 = (rect.x + rect.w).clamp(0, width as i32) as usize;
    let y1 = (rect.y + rect.h).clamp(0, height as i32) as usize;
    for y in y0..y1 {
        let row = y * width;
        for x in x0..x1 {
            buf[row + x] = color;
        }
    }
}

/// Render one frame: sky and floor halves, then the ordered draw list.
pub fn render_frame(buf: &mut [u32], width: usize, height: usize, commands: &[DrawCommand]) {
    let sky = pack_rgb(30, 30, 70);
    let ground = pack_rgb(40, 40, 40);

    let mid = height / 2;
    for y in 0..mid {
        let row = y * width;
        buf[row..row + width].fill(sky);
    }
    for y in mid..height {
        let row = y * width;
        buf[row..row + width].fill(ground);
    }

    for command in commands {
        match *command {
            DrawCommand::WallSlice {
                texture,
                dest,
                src_column,
                shade,
            } => {
                let mut color = wall_color(texture);
                // Alternate texel columns read a touch darker.
                if (src_column as i32) % 2 == 1 {
                    color = apply_shade(color, 230);
                }
                fill_rect(buf, width, height, dest, apply_shade(color, shade));
            }
            DrawCommand::Sprite {
                texture,
                dest,
                src: _,
                shade,
            } => {
                fill_rect(
                    buf,
                    width,
                    height,
                    dest,
                    apply_shade(sprite_color(texture), shade),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::SrcRect;

    #[test]
    fn clear_splits_sky_and_ground() {
        let mut buf = vec![0u32; 8 * 8];
        render_frame(&mut buf, 8, 8, &[]);
        assert_eq!(buf[0], pack_rgb(30, 30, 70));
        assert_eq!(buf[8 * 7], pack_rgb(40, 40, 40));
    }

    #[test]
    fn rects_are_clipped_to_the_buffer() {
        let mut buf = vec![0u32; 8 * 8];
        let commands = [DrawCommand::Sprite {
            texture: 1,
            dest: ScreenRect {
                x: -4,
                y: -4,
                w: 100,
                h: 100,
            },
            src: SrcRect::FULL,
            shade: 255,
        }];
        // Must not index out of range.
        render_frame(&mut buf, 8, 8, &commands);
        assert!(buf.iter().all(|&px| px == sprite_color(1)));
    }

    #[test]
    fn nearer_commands_overdraw_farther_ones() {
        let mut buf = vec![0u32; 4 * 4];
        let far = DrawCommand::Sprite {
            texture: 1,
            dest: ScreenRect {
                x: 0,
                y: 0,
                w: 4,
                h: 4,
            },
            src: SrcRect::FULL,
            shade: 255,
        };
        let near = DrawCommand::Sprite {
            texture: 2,
            dest: ScreenRect {
                x: 0,
                y: 0,
                w: 4,
                h: 4,
            },
            src: SrcRect::FULL,
            shade: 255,
        };
        render_frame(&mut buf, 4, 4, &[far, near]);
        assert_eq!(buf[0], sprite_color(2));
    }

    #[test]
    fn shade_darkens_channels() {
        let color = pack_rgb(200, 100, 50);
        let half = apply_shade(color, 128);
        assert_eq!((half >> 16) & 0xFF, 200 * 128 / 255);
        assert_eq!((half >> 8) & 0xFF, 100 * 128 / 255);
        assert_eq!(half & 0xFF, 50 * 128 / 255);
        assert_eq!(apply_shade(color, 255), color);
    }
}
