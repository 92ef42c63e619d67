use std::path::{Path, PathBuf};
use std::process;

use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serlio_core::{
    compute_point_seed, compute_seed, encode, get_rule_attributes, materials_by_stream,
    sort_rule_attributes, CallbackSettings, Callbacks, EncodedGeometry, GeneratedMesh,
    MeshCallbacks, RuleFileInfo,
};
use serlio_scene::{Associations, HostMesh, StructureRegistry};

const DEFAULT_RULE_FILE: &str = "rules.cgb";

#[derive(Debug, Default, PartialEq)]
struct HeadlessArgs {
    mesh_path: Option<PathBuf>,
    geometries_path: Option<PathBuf>,
    rules_path: Option<PathBuf>,
    rule_file: Option<String>,
    config_path: Option<PathBuf>,
    print: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MeshSummary {
    vertices: usize,
    faces: usize,
    uv_sets: Vec<String>,
    has_normals: bool,
    material_records: usize,
    distinct_materials: usize,
    seed: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct AttributeSummary {
    name: String,
    nice_name: String,
    rule_file: String,
    groups: Vec<String>,
    order: String,
    group_order: String,
}

#[derive(Debug, Default, Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    mesh: Option<MeshSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<AttributeSummary>,
}

pub fn run(args: &[String]) -> Result<(), String> {
    let parsed = parse_headless_args(args)?;
    if parsed.mesh_path.is_none() && parsed.geometries_path.is_none() && parsed.rules_path.is_none()
    {
        print_headless_help();
        return Ok(());
    }

    let settings = match &parsed.config_path {
        Some(path) => load_settings(path)?,
        None => CallbackSettings::default(),
    };

    let mut report = Report::default();
    if let Some(path) = &parsed.mesh_path {
        let mesh: GeneratedMesh = load_json(path)?;
        report.mesh = Some(summarize_mesh(&mesh, &settings)?);
    } else if let Some(path) = &parsed.geometries_path {
        let geometries: Vec<EncodedGeometry> = load_json(path)?;
        report.mesh = Some(summarize_geometries(&geometries, &settings)?);
    }

    if let Some(path) = &parsed.rules_path {
        let info: RuleFileInfo = load_json(path)?;
        let rule_file = parsed.rule_file.as_deref().unwrap_or(DEFAULT_RULE_FILE);
        report.attributes = ordered_attributes(rule_file, &info);
    }

    if let Some(mesh) = &report.mesh {
        tracing::info!(
            "headless: {} vertices, {} faces, {} material records",
            mesh.vertices,
            mesh.faces,
            mesh.material_records
        );
    }
    tracing::info!("headless: {} rule attributes", report.attributes.len());

    if parsed.print {
        let json = serde_json::to_string_pretty(&report).map_err(|err| err.to_string())?;
        println!("{json}");
    }

    tracing::info!("headless: completed");
    Ok(())
}

fn parse_headless_args(args: &[String]) -> Result<HeadlessArgs, String> {
    let mut parsed = HeadlessArgs::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--mesh" => parsed.mesh_path = Some(path_value("--mesh", iter.next())?),
            "--geometries" => {
                parsed.geometries_path = Some(path_value("--geometries", iter.next())?)
            }
            "--rules" => parsed.rules_path = Some(path_value("--rules", iter.next())?),
            "--config" => parsed.config_path = Some(path_value("--config", iter.next())?),
            "--rule-file" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--rule-file requires a name".to_string())?;
                parsed.rule_file = Some(value.clone());
            }
            "--log-level" => {
                iter.next();
            }
            "--print" => parsed.print = true,
            "--help" | "-h" => {
                print_headless_help();
                process::exit(0);
            }
            _ => {}
        }
    }

    Ok(parsed)
}

fn path_value(flag: &str, value: Option<&String>) -> Result<PathBuf, String> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| format!("{flag} requires a path"))
}

fn print_headless_help() {
    println!(
        "Options:\n  --mesh <path>\n  --geometries <path>\n  --rules <path>\n  --rule-file <name>\n  --config <path>\n  --log-level <level>\n  --print"
    );
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = std::fs::read(path).map_err(|err| format!("{}: {}", path.display(), err))?;
    serde_json::from_slice(&data).map_err(|err| format!("{}: {}", path.display(), err))
}

fn load_settings(path: &Path) -> Result<CallbackSettings, String> {
    let data = std::fs::read(path).map_err(|err| format!("{}: {}", path.display(), err))?;
    CallbackSettings::from_json(&data).map_err(|err| format!("{}: {}", path.display(), err))
}

fn summarize_mesh(mesh: &GeneratedMesh, settings: &CallbackSettings) -> Result<MeshSummary, String> {
    let mut output = HostMesh::new();
    let mut registry = StructureRegistry::new();
    MeshCallbacks::new(
        Associations::new(),
        &mut output,
        &mut registry,
        settings.clone(),
    )
    .add_mesh(mesh)
    .map_err(|err| err.to_string())?;

    Ok(summarize_output(&output, settings, compute_seed(&mesh.vertices)))
}

fn summarize_geometries(
    geometries: &[EncodedGeometry],
    settings: &CallbackSettings,
) -> Result<MeshSummary, String> {
    let mut output = HostMesh::new();
    let mut registry = StructureRegistry::new();
    let mut callbacks = MeshCallbacks::new(
        Associations::new(),
        &mut output,
        &mut registry,
        settings.clone(),
    );
    encode(geometries, &mut callbacks).map_err(|err| err.to_string())?;

    let points: Vec<Vec3> = output.positions.iter().map(|p| Vec3::from_array(*p)).collect();
    Ok(summarize_output(&output, settings, compute_point_seed(&points)))
}

fn summarize_output(output: &HostMesh, settings: &CallbackSettings, seed: i32) -> MeshSummary {
    let stream = output
        .metadata
        .channel(&settings.material_channel)
        .and_then(|channel| channel.data_stream(&settings.material_stream));
    let (material_records, distinct_materials) = stream
        .map(|stream| (stream.element_count(), materials_by_stream(stream).len()))
        .unwrap_or((0, 0));

    MeshSummary {
        vertices: output.vertex_count(),
        faces: output.face_count(),
        uv_sets: output
            .uv_sets
            .iter()
            .map(|set| format!("{} ({})", set.name, set.uv_count()))
            .collect(),
        has_normals: output.face_vertex_normals.is_some(),
        material_records,
        distinct_materials,
        seed,
    }
}

fn ordered_attributes(rule_file: &str, info: &RuleFileInfo) -> Vec<AttributeSummary> {
    let mut attributes = get_rule_attributes(rule_file, info);
    sort_rule_attributes(&mut attributes);
    attributes
        .into_iter()
        .map(|attribute| AttributeSummary {
            order: attribute.order.to_string(),
            group_order: attribute.group_order.to_string(),
            name: attribute.fq_name,
            nice_name: attribute.nice_name,
            rule_file: attribute.rule_file,
            groups: attribute.groups,
        })
        .collect()
}
