use crate::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read-only access to the benchmark's bundled files (scene, models, textures).
pub trait AssetSource {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError>;

    fn exists(&self, name: &str) -> bool {
        self.load(name).is_ok()
    }

    fn load_string(&self, name: &str) -> Result<String, AssetError> {
        let bytes = self.load(name)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Assets stored below a directory on the local file system.
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DirectoryAssets {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl AssetSource for DirectoryAssets {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        let full_path = self.root.join(name);
        let mut file = match File::open(&full_path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetError::NotFound(name.to_string()));
            }
            Err(err) => return Err(AssetError::Io(name.to_string(), err)),
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|err| AssetError::Io(name.to_string(), err))?;
        Ok(buf)
    }

    fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }
}

/// Assets held in memory, keyed by name.
#[derive(Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<B: Into<Vec<u8>>>(&mut self, name: &str, bytes: B) {
        self.files.insert(name.to_string(), bytes.into());
    }
}

impl AssetSource for MemoryAssets {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }
}

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone)]
pub struct Rgba8Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Rgba8Image {
    pub fn white() -> Self {
        Rgba8Image {
            width: 1,
            height: 1,
            pixels: vec![0xff; 4],
        }
    }
}

pub fn load_png(assets: &dyn AssetSource, name: &str) -> Result<Rgba8Image, AssetError> {
    let bytes = assets.load(name)?;
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .map_err(|err| AssetError::Image(name.to_string(), err))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(Rgba8Image {
        width,
        height,
        pixels: img.into_raw(),
    })
}
