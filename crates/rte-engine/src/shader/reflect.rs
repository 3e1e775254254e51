//! WGSL front-end: compiles one stage with `naga` and links two stages into a
//! program interface (named attributes, uniforms and samplers).
//!
//! Both GPU backends run shaders through this module so that compile/link
//! diagnostics and name resolution are identical with and without a device.

use std::collections::BTreeMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, ArraySize, Binding, Handle, ImageDimension, Scalar, TypeInner, VectorSize};

use crate::gpu::{ShaderStage, UniformType};

/// Scalar kind + component count of a stage input/output.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IoType {
    pub scalar: naga::ScalarKind,
    pub components: u32,
}

/// One `@location` input or output of an entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceVar {
    pub name: String,
    pub location: u32,
    pub ty: Option<IoType>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceKind {
    Uniform(UniformType),
    Sampler,
}

/// A `@group(0) @binding(n)` global used by the entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBinding {
    pub name: String,
    pub binding: u32,
    pub kind: ResourceKind,
}

/// Reflection of one compiled stage.
#[derive(Debug, Clone)]
pub struct StageInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: Vec<InterfaceVar>,
    pub outputs: Vec<InterfaceVar>,
    pub resources: Vec<ResourceBinding>,
}

/// Vertex input as seen by the program.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAttribute {
    pub name: String,
    pub location: u32,
    pub components: u32,
}

/// Uniform (buffer or texture) as seen by the program. `location` is the binding index.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUniform {
    pub name: String,
    pub location: u32,
    pub ty: UniformType,
}

/// Linked program interface.
#[derive(Debug, Clone, Default)]
pub struct ProgramInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub attributes: Vec<ActiveAttribute>,
    pub uniforms: Vec<ActiveUniform>,
    /// Bindings that receive the backend's default sampler.
    pub samplers: Vec<u32>,
}

impl ProgramInterface {
    pub fn attribute(&self, name: &str) -> Option<&ActiveAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&ActiveUniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    pub fn uniform_at(&self, location: u32) -> Option<&ActiveUniform> {
        self.uniforms.iter().find(|u| u.location == location)
    }
}

/// Parses and validates `source`, then reflects the entry point of `stage`.
///
/// The error string is the compiler log.
pub fn compile_stage(source: &str, stage: ShaderStage) -> Result<StageInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    let info = validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    let (ep_index, ep) = module
        .entry_points
        .iter()
        .enumerate()
        .find(|(_, ep)| ep.stage == wanted)
        .ok_or_else(|| format!("no @{stage} entry point in source"))?;

    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        collect_io(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_io(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let ep_info = info.get_entry_point(ep_index);
    let mut resources = Vec::new();

    for (handle, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };
        if ep_info[handle].is_empty() {
            continue;
        }

        let name = var.name.clone().unwrap_or_default();
        if rb.group != 0 {
            return Err(format!(
                "`{name}` is declared in bind group {}; only group 0 is supported",
                rb.group
            ));
        }

        let kind = match var.space {
            AddressSpace::Uniform => ResourceKind::Uniform(
                uniform_type(&module, var.ty)
                    .ok_or_else(|| format!("uniform `{name}` has an unsupported type"))?,
            ),
            AddressSpace::Handle => match module.types[var.ty].inner {
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    ..
                } => ResourceKind::Uniform(UniformType::Texture2d),
                TypeInner::Sampler { comparison: false } => ResourceKind::Sampler,
                _ => return Err(format!("resource `{name}` has an unsupported handle type")),
            },
            _ => return Err(format!("`{name}` uses an unsupported address space")),
        };

        resources.push(ResourceBinding {
            name,
            binding: rb.binding,
            kind,
        });
    }

    Ok(StageInterface {
        stage,
        entry_point: ep.name.clone(),
        inputs,
        outputs,
        resources,
    })
}

/// Checks that two stages fit together and merges their interfaces.
///
/// The error string is the linker log.
pub fn link(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<ProgramInterface, String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err("program needs one vertex and one fragment stage".to_string());
    }

    let mut log = Vec::new();

    for input in &fragment.inputs {
        match vertex.outputs.iter().find(|o| o.location == input.location) {
            None => log.push(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )),
            Some(out) if out.ty != input.ty => log.push(format!(
                "fragment input `{}` at location {} does not match vertex output `{}`",
                input.name, input.location, out.name
            )),
            Some(_) => {}
        }
    }

    let mut merged: BTreeMap<u32, &ResourceBinding> = BTreeMap::new();
    for res in vertex.resources.iter().chain(&fragment.resources) {
        if let Some(prev) = merged.get(&res.binding).copied() {
            if prev.name != res.name || prev.kind != res.kind {
                log.push(format!(
                    "binding {} is declared as `{}` and `{}`",
                    res.binding, prev.name, res.name
                ));
            }
            continue;
        }
        if let Some(other) = merged.values().find(|r| r.name == res.name).copied() {
            log.push(format!(
                "`{}` is bound at both {} and {}",
                res.name, other.binding, res.binding
            ));
            continue;
        }
        merged.insert(res.binding, res);
    }

    if !log.is_empty() {
        return Err(log.join("\n"));
    }

    let attributes = vertex
        .inputs
        .iter()
        .map(|i| ActiveAttribute {
            name: i.name.clone(),
            location: i.location,
            components: i.ty.map_or(0, |t| t.components),
        })
        .collect();

    let mut uniforms = Vec::new();
    let mut samplers = Vec::new();
    for res in merged.values() {
        match res.kind {
            ResourceKind::Uniform(ty) => uniforms.push(ActiveUniform {
                name: res.name.clone(),
                location: res.binding,
                ty,
            }),
            ResourceKind::Sampler => samplers.push(res.binding),
        }
    }

    Ok(ProgramInterface {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.entry_point.clone(),
        attributes,
        uniforms,
        samplers,
    })
}

fn collect_io(
    module: &naga::Module,
    name: Option<&str>,
    ty: Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            ty: io_type(module, ty),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_io(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn io_type(module: &naga::Module, ty: Handle<naga::Type>) -> Option<IoType> {
    match module.types[ty].inner {
        TypeInner::Scalar(s) => Some(IoType {
            scalar: s.kind,
            components: 1,
        }),
        TypeInner::Vector { size, scalar } => Some(IoType {
            scalar: scalar.kind,
            components: size as u32,
        }),
        _ => None,
    }
}

fn uniform_type(module: &naga::Module, ty: Handle<naga::Type>) -> Option<UniformType> {
    match module.types[ty].inner {
        TypeInner::Scalar(Scalar::F32) => Some(UniformType::Float),
        TypeInner::Scalar(Scalar::I32) => Some(UniformType::Int),
        TypeInner::Vector {
            size,
            scalar: Scalar::F32,
        } => Some(match size {
            VectorSize::Bi => UniformType::Vec2,
            VectorSize::Tri => UniformType::Vec3,
            VectorSize::Quad => UniformType::Vec4,
        }),
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar: Scalar::F32,
        } => Some(UniformType::Mat4),
        TypeInner::Array {
            base,
            size: ArraySize::Constant(len),
            ..
        } => match module.types[base].inner {
            TypeInner::Vector {
                size: VectorSize::Quad,
                scalar: Scalar::F32,
            } => Some(UniformType::Vec4Array(len.get())),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var<uniform> transform: mat4x4<f32>;

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform * vec4<f32>(position, 1.0);
    out.uv = uv;
    return out;
}
"#;

    const FS: &str = r#"
@group(0) @binding(1) var<uniform> tint: vec4<f32>;
@group(0) @binding(2) var image: texture_2d<f32>;
@group(0) @binding(3) var image_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return tint * textureSample(image, image_sampler, uv);
}
"#;

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn vertex_inputs_are_reflected_by_name() {
        let vs = compile_stage(VS, ShaderStage::Vertex).unwrap();
        assert_eq!(vs.entry_point, "vs_main");
        let names: Vec<_> = vs.inputs.iter().map(|i| (i.name.as_str(), i.location)).collect();
        assert_eq!(names, vec![("position", 0), ("uv", 1)]);
        assert_eq!(vs.outputs.len(), 1);
    }

    #[test]
    fn syntax_error_carries_compiler_log() {
        let err = compile_stage("fn broken( {", ShaderStage::Vertex).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn missing_entry_point_is_a_compile_error() {
        let err = compile_stage(FS, ShaderStage::Vertex).unwrap_err();
        assert!(err.contains("vertex"));
    }

    #[test]
    fn unused_globals_are_not_reflected() {
        let src = r#"
@group(0) @binding(0) var<uniform> unused: vec4<f32>;
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let fs = compile_stage(src, ShaderStage::Fragment).unwrap();
        assert!(fs.resources.is_empty());
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn link_merges_uniforms_and_samplers() {
        let vs = compile_stage(VS, ShaderStage::Vertex).unwrap();
        let fs = compile_stage(FS, ShaderStage::Fragment).unwrap();
        let program = link(&vs, &fs).unwrap();

        assert_eq!(program.uniform("transform").unwrap().ty, UniformType::Mat4);
        assert_eq!(program.uniform("tint").unwrap().location, 1);
        assert_eq!(program.uniform("image").unwrap().ty, UniformType::Texture2d);
        assert_eq!(program.samplers, vec![3]);
        assert_eq!(program.attribute("uv").unwrap().components, 2);
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let fs_src = r#"
@fragment
fn fs_main(@location(4) extra: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(extra, 1.0);
}
"#;
        let vs = compile_stage(VS, ShaderStage::Vertex).unwrap();
        let fs = compile_stage(fs_src, ShaderStage::Fragment).unwrap();
        let log = link(&vs, &fs).unwrap_err();
        assert!(log.contains("location 4"));
    }

    #[test]
    fn conflicting_bindings_fail_to_link() {
        let fs_src = r#"
@group(0) @binding(0) var<uniform> other: vec4<f32>;
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return other;
}
"#;
        let vs = compile_stage(VS, ShaderStage::Vertex).unwrap();
        let fs = compile_stage(fs_src, ShaderStage::Fragment).unwrap();
        let log = link(&vs, &fs).unwrap_err();
        assert!(log.contains("binding 0"));
    }
}
