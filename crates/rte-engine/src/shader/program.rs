use std::collections::HashMap;

use crate::error::{RenderError, Result};
use crate::gpu::{GpuApi, ProgramId, ShaderId, ShaderStage, TextureId, UniformType, UniformValue};

/// Where a uniform binding gets its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformSource {
    Value(UniformValue),
    /// Bind `texture` to `unit`, then point the sampler uniform at the unit.
    Texture { texture: TextureId, unit: u32 },
}

impl UniformSource {
    fn kind(&self) -> &'static str {
        match self {
            UniformSource::Value(v) => v.kind(),
            UniformSource::Texture { .. } => "texture",
        }
    }

    fn fits(&self, ty: UniformType) -> bool {
        match self {
            UniformSource::Value(v) => ty.accepts(v),
            UniformSource::Texture { .. } => ty == UniformType::Texture2d,
        }
    }
}

/// A uniform by name, before resolution against a program.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub source: UniformSource,
}

impl Uniform {
    pub fn value(name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        Self {
            name: name.into(),
            source: UniformSource::Value(value.into()),
        }
    }

    pub fn texture(name: impl Into<String>, texture: TextureId, unit: u32) -> Self {
        Self {
            name: name.into(),
            source: UniformSource::Texture { texture, unit },
        }
    }
}

/// A uniform resolved to its location and checked against its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    pub name: String,
    pub location: u32,
    pub source: UniformSource,
}

#[derive(Debug, Copy, Clone)]
struct Handles {
    program: ProgramId,
    vertex: ShaderId,
    fragment: ShaderId,
}

/// A linked vertex + fragment program with cached name resolution.
///
/// Attribute and uniform locations are read once after linking. The binding
/// set holds uniforms that must be re-pushed on every draw (see
/// [`ShaderProgram::bind_uniforms`]); it is rebuilt whenever a resource it
/// points at is recreated, so it never holds a stale handle.
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    handles: Option<Handles>,
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, (u32, UniformType)>,
    bindings: Vec<UniformBinding>,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    ///
    /// Stages already created are deleted on every failure path.
    pub fn compile(
        gpu: &mut dyn GpuApi,
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self> {
        let vertex = compile_stage(gpu, name, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_stage(gpu, name, ShaderStage::Fragment, fragment_source) {
            Ok(id) => id,
            Err(e) => {
                gpu.delete_shader(vertex);
                return Err(e);
            }
        };

        let program = match gpu.link_program(vertex, fragment) {
            Ok(id) => id,
            Err(log) => {
                gpu.delete_shader(vertex);
                gpu.delete_shader(fragment);
                return Err(RenderError::ShaderLink {
                    name: name.to_string(),
                    log,
                });
            }
        };

        let Some(interface) = gpu.program_interface(program) else {
            gpu.delete_program(program);
            gpu.delete_shader(vertex);
            gpu.delete_shader(fragment);
            return Err(RenderError::ShaderLink {
                name: name.to_string(),
                log: "linked program has no interface".to_string(),
            });
        };

        let attributes = interface
            .attributes
            .iter()
            .map(|a| (a.name.clone(), a.location))
            .collect();
        let uniforms = interface
            .uniforms
            .iter()
            .map(|u| (u.name.clone(), (u.location, u.ty)))
            .collect();

        log::debug!("shader `{name}`: linked program {}", program.raw());

        Ok(Self {
            name: name.to_string(),
            handles: Some(Handles {
                program,
                vertex,
                fragment,
            }),
            attributes,
            uniforms,
            bindings: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program_id(&self) -> Option<ProgramId> {
        self.handles.map(|h| h.program)
    }

    pub fn attribute_location(&self, name: &str) -> Result<u32> {
        self.attributes
            .get(name)
            .copied()
            .ok_or_else(|| self.not_found("attribute", name))
    }

    pub fn uniform_location(&self, name: &str) -> Result<u32> {
        self.uniform(name).map(|(location, _)| location)
    }

    pub fn uniform_type(&self, name: &str) -> Result<UniformType> {
        self.uniform(name).map(|(_, ty)| ty)
    }

    fn uniform(&self, name: &str) -> Result<(u32, UniformType)> {
        self.uniforms
            .get(name)
            .copied()
            .ok_or_else(|| self.not_found("uniform", name))
    }

    fn not_found(&self, kind: &'static str, name: &str) -> RenderError {
        RenderError::NameNotFound {
            kind,
            name: name.to_string(),
            program: self.name.clone(),
        }
    }

    fn resolve(&self, name: &str, source: &UniformSource) -> Result<u32> {
        let (location, ty) = self.uniform(name)?;
        if !source.fits(ty) {
            return Err(RenderError::UniformTypeMismatch {
                name: name.to_string(),
                expected: ty,
                found: source.kind(),
            });
        }
        Ok(location)
    }

    // ── binding set ───────────────────────────────────────────────────────

    /// Resolves and appends `uniforms`. Nothing is added if any of them fails.
    pub fn add_uniforms(&mut self, uniforms: impl IntoIterator<Item = Uniform>) -> Result<()> {
        let mut resolved = Vec::new();
        for u in uniforms {
            let location = self.resolve(&u.name, &u.source)?;
            resolved.push(UniformBinding {
                name: u.name,
                location,
                source: u.source,
            });
        }
        self.bindings.extend(resolved);
        Ok(())
    }

    pub fn clear_uniforms(&mut self) {
        self.bindings.clear();
    }

    pub fn bindings(&self) -> &[UniformBinding] {
        &self.bindings
    }

    // ── activation ────────────────────────────────────────────────────────

    pub fn bind(&self, gpu: &mut dyn GpuApi) {
        match self.handles {
            Some(h) => gpu.use_program(Some(h.program)),
            None => log::warn!("bind of released shader `{}` ignored", self.name),
        }
    }

    pub fn unbind(&self, gpu: &mut dyn GpuApi) {
        gpu.use_program(None);
    }

    /// Pushes every binding of the set. The program must be bound.
    pub fn bind_uniforms(&self, gpu: &mut dyn GpuApi) {
        for b in &self.bindings {
            match &b.source {
                UniformSource::Value(v) => gpu.set_uniform(b.location, v),
                UniformSource::Texture { texture, unit } => {
                    gpu.bind_texture(*unit, *texture);
                    gpu.set_uniform(b.location, &UniformValue::TextureUnit(*unit));
                }
            }
        }
    }

    /// Type-checked one-off write, outside the binding set. The program must be
    /// bound.
    pub fn set_uniform(
        &self,
        gpu: &mut dyn GpuApi,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<()> {
        let value = value.into();
        let location = self.resolve(name, &UniformSource::Value(value.clone()))?;
        gpu.set_uniform(location, &value);
        Ok(())
    }

    /// Binds `texture` to `unit` and points uniform `name` at it.
    pub fn set_texture(
        &self,
        gpu: &mut dyn GpuApi,
        name: &str,
        texture: TextureId,
        unit: u32,
    ) -> Result<()> {
        let location = self.resolve(name, &UniformSource::Texture { texture, unit })?;
        gpu.bind_texture(unit, texture);
        gpu.set_uniform(location, &UniformValue::TextureUnit(unit));
        Ok(())
    }

    /// Deletes the program and both stages. Later calls do nothing.
    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        let Some(h) = self.handles.take() else {
            return;
        };
        gpu.delete_program(h.program);
        gpu.delete_shader(h.vertex);
        gpu.delete_shader(h.fragment);
        self.bindings.clear();
        log::trace!("shader `{}`: released", self.name);
    }

    pub fn is_released(&self) -> bool {
        self.handles.is_none()
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(h) = self.handles {
            log::warn!(
                "shader `{}` dropped without release; leaking program {}",
                self.name,
                h.program.raw()
            );
        }
    }
}

fn compile_stage(
    gpu: &mut dyn GpuApi,
    name: &str,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderId> {
    gpu.create_shader(stage, source).map_err(|log| {
        log::error!("shader `{name}`: {stage} stage failed to compile");
        RenderError::ShaderCompile {
            name: name.to_string(),
            stage,
            log,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::HeadlessApi;

    const VS: &str = r#"
@group(0) @binding(0) var<uniform> offset: vec4<f32>;

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0) + offset;
}
"#;

    const FS: &str = r#"
@group(0) @binding(1) var<uniform> color: vec4<f32>;
@group(0) @binding(2) var tex: texture_2d<f32>;
@group(0) @binding(3) var tex_sampler: sampler;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return color * textureSample(tex, tex_sampler, vec2<f32>(0.5));
}
"#;

    fn program(gpu: &mut HeadlessApi) -> ShaderProgram {
        ShaderProgram::compile(gpu, "test", VS, FS).unwrap()
    }

    // ── resolution ────────────────────────────────────────────────────────

    #[test]
    fn names_resolve_to_locations() {
        let mut gpu = HeadlessApi::new(4, 4);
        let mut p = program(&mut gpu);

        assert_eq!(p.attribute_location("position").unwrap(), 0);
        assert_eq!(p.uniform_location("color").unwrap(), 1);
        assert_eq!(p.uniform_type("tex").unwrap(), UniformType::Texture2d);

        let err = p.uniform_location("colour").unwrap_err();
        assert!(matches!(err, RenderError::NameNotFound { kind: "uniform", .. }));
        p.release(&mut gpu);
    }

    #[test]
    fn wrong_value_kind_is_rejected() {
        let mut gpu = HeadlessApi::new(4, 4);
        let mut p = program(&mut gpu);

        let err = p
            .add_uniforms([Uniform::value("color", 1.0_f32)])
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::UniformTypeMismatch {
                expected: UniformType::Vec4,
                found: "float",
                ..
            }
        ));
        assert!(p.bindings().is_empty());
        p.release(&mut gpu);
    }

    // ── binding set ───────────────────────────────────────────────────────

    #[test]
    fn texture_binding_assigns_unit() {
        let mut gpu = HeadlessApi::new(4, 4);
        let mut p = program(&mut gpu);
        let tex = gpu.create_texture(1, 1, Some(&[255u8; 4][..])).unwrap();

        p.add_uniforms([Uniform::texture("tex", tex, 3)]).unwrap();
        p.bind(&mut gpu);
        gpu.take_uniform_writes();
        p.bind_uniforms(&mut gpu);

        assert_eq!(gpu.take_uniform_writes(), vec![(2, UniformValue::TextureUnit(3))]);
        assert_eq!(gpu.take_error(), None);

        p.release(&mut gpu);
        gpu.delete_texture(tex);
    }

    #[test]
    fn cleared_bindings_do_not_resurface() {
        let mut gpu = HeadlessApi::new(4, 4);
        let mut p = program(&mut gpu);

        p.add_uniforms([Uniform::value("color", glam::Vec4::ONE)]).unwrap();
        p.clear_uniforms();
        p.add_uniforms([Uniform::value("offset", glam::Vec4::ZERO)]).unwrap();

        p.bind(&mut gpu);
        gpu.take_uniform_writes();
        p.bind_uniforms(&mut gpu);

        assert_eq!(gpu.take_uniform_writes(), vec![(0, UniformValue::Vec4([0.0; 4]))]);
        p.release(&mut gpu);
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn release_is_idempotent() {
        let mut gpu = HeadlessApi::new(4, 4);
        let mut p = program(&mut gpu);
        p.release(&mut gpu);
        p.release(&mut gpu);

        assert!(p.is_released());
        assert_eq!(gpu.live_programs(), 0);
        assert_eq!(gpu.live_shaders(), 0);
        assert_eq!(gpu.invalid_deletes(), 0);
    }

    #[test]
    fn failed_fragment_compile_deletes_vertex_stage() {
        let mut gpu = HeadlessApi::new(4, 4);
        let err =
            ShaderProgram::compile(&mut gpu, "broken", VS, "@fragment fn fs_main( {").unwrap_err();

        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(gpu.live_shaders(), 0);
    }
}
