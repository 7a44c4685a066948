use image::{Rgba, RgbaImage};

/// Straight-alpha Porter-Duff "over" of `layer` onto `base`, in place.
/// Both images must share dimensions; fully transparent layer pixels leave
/// `base` untouched.
pub fn alpha_composite(base: &mut RgbaImage, layer: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), layer.dimensions());
    for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
        if src[3] == 0 {
            continue;
        }
        *dst = over(*dst, *src);
    }
}

pub(super) fn over(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = f32::from(foreground[3]) / 255.0;
    let bg_alpha = f32::from(background[3]) / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |fg: u8, bg: u8| -> u8 {
        let value =
            (f32::from(fg) * fg_alpha + f32::from(bg) * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(foreground[0], background[0]),
        channel(foreground[1], background[1]),
        channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
