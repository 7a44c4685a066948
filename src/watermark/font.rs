//! Font resolution, measurement and glyph rasterization.
//!
//! Resolution never fails: the requested family is tried first, then the
//! fixed system default family, and finally the built-in bitmap font.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use walkdir::WalkDir;

use super::builtin_font;
use super::FontFamily;
use crate::geometry::{ImagePoint, TextBox};

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];
const FONT_DIR_MAX_DEPTH: usize = 4;
const SYSTEM_DEFAULT_STEMS: &[&str] = &[
    "arial",
    "dejavusans",
    "liberationsans-regular",
    "notosans-regular",
    "helvetica",
];

/// Where a resolved face came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontOrigin {
    Requested(PathBuf),
    SystemDefault(PathBuf),
    Builtin,
}

enum FontFace {
    Outline(FontVec),
    Builtin,
}

pub struct LoadedFont {
    face: FontFace,
    origin: FontOrigin,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("origin", &self.origin)
            .finish()
    }
}

impl LoadedFont {
    pub const fn builtin() -> Self {
        Self {
            face: FontFace::Builtin,
            origin: FontOrigin::Builtin,
        }
    }

    pub fn origin(&self) -> &FontOrigin {
        &self.origin
    }

    /// Bounding box of `text` rendered at `font_size` pixels.
    pub fn measure(&self, text: &str, font_size: u32) -> TextBox {
        match &self.face {
            FontFace::Builtin => builtin_font::measure(text, font_size),
            FontFace::Outline(font) => {
                let scaled = font.as_scaled(PxScale::from(font_size as f32));
                let width = advance_width(&scaled, text);
                let height = scaled.ascent() - scaled.descent();
                TextBox::new(
                    width.ceil().max(0.0) as u32,
                    height.ceil().max(0.0) as u32,
                )
            }
        }
    }

    /// Draws `text` with the top of its box at `origin`. Glyph coverage scales
    /// the alpha of `color`; overlapping glyph edges keep the stronger alpha.
    pub fn draw(
        &self,
        layer: &mut RgbaImage,
        origin: ImagePoint,
        text: &str,
        font_size: u32,
        color: Rgba<u8>,
    ) {
        let FontFace::Outline(font) = &self.face else {
            builtin_font::draw(layer, origin, text, font_size, color);
            return;
        };

        let scale = PxScale::from(font_size as f32);
        let scaled = font.as_scaled(scale);
        let baseline_y = origin.y as f32 + scaled.ascent();
        let layer_width = i64::from(layer.width());
        let layer_height = i64::from(layer.height());
        let max_alpha = f32::from(color[3]);
        let mut cursor_x = origin.x as f32;
        let mut previous: Option<GlyphId> = None;

        for c in text.chars() {
            let glyph_id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            let glyph =
                glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    let x = i64::from(px) + bounds.min.x as i64;
                    let y = i64::from(py) + bounds.min.y as i64;
                    if x < 0 || y < 0 || x >= layer_width || y >= layer_height {
                        return;
                    }
                    let alpha = (coverage.clamp(0.0, 1.0) * max_alpha).round() as u8;
                    if alpha == 0 {
                        return;
                    }
                    let pixel = layer.get_pixel_mut(x as u32, y as u32);
                    if alpha > pixel[3] {
                        *pixel = Rgba([color[0], color[1], color[2], alpha]);
                    }
                });
            }
            cursor_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
    }
}

fn advance_width(scaled: &ab_glyph::PxScaleFont<&FontVec>, text: &str) -> f32 {
    let mut width = 0.0_f32;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
    width
}

/// Locates and caches font faces for each [`FontFamily`].
pub struct FontResolver {
    search_dirs: Vec<PathBuf>,
    file_index: OnceCell<HashMap<String, PathBuf>>,
    cache: RefCell<HashMap<FontFamily, Rc<LoadedFont>>>,
}

impl std::fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResolver")
            .field("search_dirs", &self.search_dirs)
            .field("cached_families", &self.cache.borrow().len())
            .finish()
    }
}

impl FontResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            file_index: OnceCell::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolver that never touches the filesystem; always yields the built-in font.
    pub fn builtin_only() -> Self {
        Self::new(Vec::new())
    }

    /// `extra_dirs` are searched before the platform font directories.
    pub fn with_system_dirs(extra_dirs: &[PathBuf]) -> Self {
        let mut dirs = extra_dirs.to_vec();
        dirs.extend(platform_font_dirs());
        Self::new(dirs)
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    pub fn resolve(&self, family: FontFamily) -> Rc<LoadedFont> {
        if let Some(font) = self.cache.borrow().get(&family) {
            return font.clone();
        }
        let font = Rc::new(self.load(family));
        self.cache.borrow_mut().insert(family, font.clone());
        font
    }

    fn load(&self, family: FontFamily) -> LoadedFont {
        if let Some((face, path)) = self.load_first(family.file_stems()) {
            tracing::debug!(family = family.label(), path = %path.display(), "resolved font");
            return LoadedFont {
                face: FontFace::Outline(face),
                origin: FontOrigin::Requested(path),
            };
        }
        if let Some((face, path)) = self.load_first(SYSTEM_DEFAULT_STEMS) {
            tracing::warn!(
                family = family.label(),
                path = %path.display(),
                "requested font family not found; using system default font"
            );
            return LoadedFont {
                face: FontFace::Outline(face),
                origin: FontOrigin::SystemDefault(path),
            };
        }
        tracing::warn!(
            family = family.label(),
            "no font files found; using built-in bitmap font"
        );
        LoadedFont::builtin()
    }

    fn load_first(&self, stems: &[&str]) -> Option<(FontVec, PathBuf)> {
        let index = self
            .file_index
            .get_or_init(|| index_font_files(&self.search_dirs));
        stems.iter().find_map(|stem| {
            let path = index.get(&stem.to_ascii_lowercase())?;
            match load_font_file(path) {
                Ok(face) => Some((face, path.clone())),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable font file");
                    None
                }
            }
        })
    }
}

fn load_font_file(path: &Path) -> Result<FontVec, String> {
    let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
    FontVec::try_from_vec(bytes).map_err(|err| err.to_string())
}

/// Maps lowercase file stem to path; earlier directories win on collisions.
fn index_font_files(dirs: &[PathBuf]) -> HashMap<String, PathBuf> {
    let mut index = HashMap::new();
    for dir in dirs.iter().filter(|dir| dir.is_dir()) {
        for entry in WalkDir::new(dir)
            .max_depth(FONT_DIR_MAX_DEPTH)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !is_font {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                index
                    .entry(stem.to_ascii_lowercase())
                    .or_insert_with(|| path.to_path_buf());
            }
        }
    }
    tracing::debug!(files = index.len(), "indexed font files");
    index
}

fn platform_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from(r"C:\Windows\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join(".fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_only_resolver_falls_back_for_every_family() {
        let resolver = FontResolver::builtin_only();
        for family in FontFamily::ALL {
            assert_eq!(resolver.resolve(family).origin(), &FontOrigin::Builtin);
        }
    }

    #[test]
    fn resolver_caches_faces_per_family() {
        let resolver = FontResolver::builtin_only();
        let first = resolver.resolve(FontFamily::Georgia);
        let second = resolver.resolve(FontFamily::Georgia);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn unparsable_font_files_are_skipped() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("Arial.ttf"), b"not a font").expect("write fake font");
        let resolver = FontResolver::new(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve(FontFamily::Arial).origin(), &FontOrigin::Builtin);
    }

    #[test]
    fn font_index_matches_stems_case_insensitively() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("truetype/dejavu");
        std::fs::create_dir_all(&nested).expect("create nested dir");
        std::fs::write(nested.join("DejaVuSans.TTF"), b"").expect("write font");
        std::fs::write(nested.join("readme.txt"), b"").expect("write readme");

        let index = index_font_files(&[dir.path().to_path_buf()]);
        assert_eq!(index.len(), 1);
        assert!(index.contains_key("dejavusans"));
    }

    #[test]
    fn builtin_font_measure_grows_with_size() {
        let font = LoadedFont::builtin();
        let small = font.measure("Copyright", 12);
        let large = font.measure("Copyright", 48);
        assert!(large.width > small.width);
        assert!(large.height > small.height);
    }
}
