use crate::*;
use log::{debug, warn};

/// Geometry and diffuse texture of one model, ready for upload.
#[derive(Debug, Clone)]
pub struct RenderModel {
    pub name: String,
    pub geometry: Geometry,
    pub texture: Rgba8Image,
}

impl RenderModel {
    /// Loads `<name>.obj` and `<name>.png`; a missing texture falls back to plain white.
    pub fn load(assets: &dyn AssetSource, name: &str) -> Result<Self, SceneError> {
        let source = assets.load_string(&format!("{}.obj", name))?;
        let geometry = parse_obj(name, &source)?;

        let texture_name = format!("{}.png", name);
        let texture = if assets.exists(&texture_name) {
            load_png(assets, &texture_name)?
        } else {
            warn!("model '{}' has no texture, using white", name);
            Rgba8Image::white()
        };

        debug!(
            "model '{}': {} vertices, {} indices, {}x{} texture",
            name,
            geometry.vertices.len(),
            geometry.indices.len(),
            texture.width,
            texture.height
        );

        Ok(RenderModel {
            name: name.to_string(),
            geometry,
            texture,
        })
    }
}

/// Six square faces of a cube map, in +x -x +y -y +z -z order.
#[derive(Debug, Clone)]
pub struct Skybox {
    pub size: u32,
    pub faces: Vec<Rgba8Image>,
}

pub const SKYBOX_DIR: &str = "skybox_android";
pub const SKYBOX_FACES: [&str; 6] = [
    "xpos.png", "xneg.png", "ypos.png", "yneg.png", "zpos.png", "zneg.png",
];

impl Skybox {
    /// Loads the optional skybox; any missing or mismatched face disables it.
    pub fn load(assets: &dyn AssetSource) -> Option<Self> {
        let mut faces = Vec::with_capacity(SKYBOX_FACES.len());
        for face in SKYBOX_FACES.iter() {
            let name = format!("{}/{}", SKYBOX_DIR, face);
            if !assets.exists(&name) {
                debug!("no skybox ({} missing)", name);
                return None;
            }
            match load_png(assets, &name) {
                Ok(image) => faces.push(image),
                Err(err) => {
                    warn!("skybox disabled: {}", err);
                    return None;
                }
            }
        }

        let size = faces[0].width;
        if faces.iter().any(|f| f.width != size || f.height != size) {
            warn!("skybox disabled: faces must be square and equally sized");
            return None;
        }
        Some(Skybox { size, faces })
    }
}
