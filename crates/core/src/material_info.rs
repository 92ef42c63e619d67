use std::cmp::Ordering;
use std::collections::BTreeMap;

use serlio_scene::{DataStream, Handle};

use crate::codec::{get_float, get_float_array, get_int, get_string};
use crate::material_metadata::{FACE_INDEX_END, FACE_INDEX_START};

fn read_doubles<const N: usize>(handle: &mut Handle, name: &str) -> [f64; N] {
    let mut data = [0.0; N];
    if let Some(values) = get_float_array(handle, name) {
        let count = values.len().min(N);
        data[..count].copy_from_slice(&values[..count]);
    }
    data
}

fn cmp_doubles(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialColor([f64; 3]);

impl MaterialColor {
    pub fn from_handle(handle: &mut Handle, name: &str) -> Self {
        Self(read_doubles(handle, name))
    }

    pub fn r(&self) -> f64 {
        self.0[0]
    }

    pub fn g(&self) -> f64 {
        self.0[1]
    }

    pub fn b(&self) -> f64 {
        self.0[2]
    }
}

impl PartialEq for MaterialColor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MaterialColor {}

impl PartialOrd for MaterialColor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MaterialColor {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_doubles(&self.0, &other.0)
    }
}

/// Texture transform stored as `[su, sv, tu, tv, rw]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialTrafo([f64; 5]);

impl MaterialTrafo {
    pub fn from_handle(handle: &mut Handle, name: &str) -> Self {
        Self(read_doubles(handle, name))
    }

    pub fn su(&self) -> f64 {
        self.0[0]
    }

    pub fn sv(&self) -> f64 {
        self.0[1]
    }

    pub fn tu(&self) -> f64 {
        self.0[2]
    }

    pub fn tv(&self) -> f64 {
        self.0[3]
    }

    pub fn rw(&self) -> f64 {
        self.0[4]
    }

    pub fn tuv(&self) -> [f64; 2] {
        [self.tu(), self.tv()]
    }

    pub fn suvw(&self) -> [f64; 3] {
        [self.su(), self.sv(), self.rw()]
    }
}

impl PartialEq for MaterialTrafo {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MaterialTrafo {}

impl PartialOrd for MaterialTrafo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MaterialTrafo {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_doubles(&self.0, &other.0)
    }
}

/// Shading-relevant view of one material record.
#[derive(Debug, Clone)]
pub struct MaterialInfo {
    pub bump_map: String,
    pub color_map: String,
    pub dirt_map: String,
    pub emissive_map: String,
    pub metallic_map: String,
    pub normal_map: String,
    pub occlusion_map: String,
    pub opacity_map: String,
    pub roughness_map: String,
    pub specular_map: String,

    pub opacity: f64,
    pub metallic: f64,
    pub roughness: f64,

    pub ambient_color: MaterialColor,
    pub diffuse_color: MaterialColor,
    pub emissive_color: MaterialColor,
    pub specular_color: MaterialColor,

    pub specularmap_trafo: MaterialTrafo,
    pub bumpmap_trafo: MaterialTrafo,
    pub colormap_trafo: MaterialTrafo,
    pub dirtmap_trafo: MaterialTrafo,
    pub emissivemap_trafo: MaterialTrafo,
    pub metallicmap_trafo: MaterialTrafo,
    pub normalmap_trafo: MaterialTrafo,
    pub occlusionmap_trafo: MaterialTrafo,
    pub opacitymap_trafo: MaterialTrafo,
    pub roughnessmap_trafo: MaterialTrafo,
}

impl MaterialInfo {
    pub fn from_handle(handle: &mut Handle) -> Self {
        let mut texture = |name: &str| get_string(handle, name).unwrap_or_default();
        let bump_map = texture("bumpMap");
        let color_map = texture("diffuseMap");
        let dirt_map = texture("diffuseMap1");
        let emissive_map = texture("emissiveMap");
        let metallic_map = texture("metallicMap");
        let normal_map = texture("normalMap");
        let occlusion_map = texture("occlusionMap");
        let opacity_map = texture("opacityMap");
        let roughness_map = texture("roughnessMap");
        let specular_map = texture("specularMap");

        Self {
            bump_map,
            color_map,
            dirt_map,
            emissive_map,
            metallic_map,
            normal_map,
            occlusion_map,
            opacity_map,
            roughness_map,
            specular_map,

            opacity: get_float(handle, "opacity").unwrap_or(1.0),
            metallic: get_float(handle, "metallic").unwrap_or(0.0),
            roughness: get_float(handle, "roughness").unwrap_or(1.0),

            ambient_color: MaterialColor::from_handle(handle, "ambientColor"),
            diffuse_color: MaterialColor::from_handle(handle, "diffuseColor"),
            emissive_color: MaterialColor::from_handle(handle, "emissiveColor"),
            specular_color: MaterialColor::from_handle(handle, "specularColor"),

            specularmap_trafo: MaterialTrafo::from_handle(handle, "specularmapTrafo"),
            bumpmap_trafo: MaterialTrafo::from_handle(handle, "bumpmapTrafo"),
            colormap_trafo: MaterialTrafo::from_handle(handle, "colormapTrafo"),
            dirtmap_trafo: MaterialTrafo::from_handle(handle, "dirtmapTrafo"),
            emissivemap_trafo: MaterialTrafo::from_handle(handle, "emissivemapTrafo"),
            metallicmap_trafo: MaterialTrafo::from_handle(handle, "metallicmapTrafo"),
            normalmap_trafo: MaterialTrafo::from_handle(handle, "normalmapTrafo"),
            occlusionmap_trafo: MaterialTrafo::from_handle(handle, "occlusionmapTrafo"),
            opacitymap_trafo: MaterialTrafo::from_handle(handle, "opacitymapTrafo"),
            roughnessmap_trafo: MaterialTrafo::from_handle(handle, "roughnessmapTrafo"),
        }
    }
}

impl PartialEq for MaterialInfo {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MaterialInfo {}

impl PartialOrd for MaterialInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MaterialInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bump_map
            .cmp(&other.bump_map)
            .then_with(|| self.color_map.cmp(&other.color_map))
            .then_with(|| self.dirt_map.cmp(&other.dirt_map))
            .then_with(|| self.emissive_map.cmp(&other.emissive_map))
            .then_with(|| self.metallic_map.cmp(&other.metallic_map))
            .then_with(|| self.normal_map.cmp(&other.normal_map))
            .then_with(|| self.occlusion_map.cmp(&other.occlusion_map))
            .then_with(|| self.opacity_map.cmp(&other.opacity_map))
            .then_with(|| self.roughness_map.cmp(&other.roughness_map))
            .then_with(|| self.specular_map.cmp(&other.specular_map))
            .then_with(|| self.opacity.total_cmp(&other.opacity))
            .then_with(|| self.metallic.total_cmp(&other.metallic))
            .then_with(|| self.roughness.total_cmp(&other.roughness))
            .then_with(|| self.ambient_color.cmp(&other.ambient_color))
            .then_with(|| self.diffuse_color.cmp(&other.diffuse_color))
            .then_with(|| self.emissive_color.cmp(&other.emissive_color))
            .then_with(|| self.specular_color.cmp(&other.specular_color))
            .then_with(|| self.specularmap_trafo.cmp(&other.specularmap_trafo))
            .then_with(|| self.bumpmap_trafo.cmp(&other.bumpmap_trafo))
            .then_with(|| self.colormap_trafo.cmp(&other.colormap_trafo))
            .then_with(|| self.dirtmap_trafo.cmp(&other.dirtmap_trafo))
            .then_with(|| self.emissivemap_trafo.cmp(&other.emissivemap_trafo))
            .then_with(|| self.metallicmap_trafo.cmp(&other.metallicmap_trafo))
            .then_with(|| self.normalmap_trafo.cmp(&other.normalmap_trafo))
            .then_with(|| self.occlusionmap_trafo.cmp(&other.occlusionmap_trafo))
            .then_with(|| self.opacitymap_trafo.cmp(&other.opacitymap_trafo))
            .then_with(|| self.roughnessmap_trafo.cmp(&other.roughnessmap_trafo))
    }
}

/// Face range `[start, end)` stored in a material record.
pub fn face_range(handle: &mut Handle) -> Option<(i32, i32)> {
    let start = get_int(handle, FACE_INDEX_START)?;
    let end = get_int(handle, FACE_INDEX_END)?;
    Some((start, end))
}

/// Distinct materials of a stream with the face ranges that use them.
pub type MaterialCache = BTreeMap<MaterialInfo, Vec<(i32, i32)>>;

pub fn materials_by_stream(stream: &DataStream) -> MaterialCache {
    let mut cache = MaterialCache::new();
    for (_, handle) in stream.elements() {
        let mut handle = handle.clone();
        let Some(range) = face_range(&mut handle) else {
            continue;
        };
        let info = MaterialInfo::from_handle(&mut handle);
        cache.entry(info).or_default().push(range);
    }
    cache
}
