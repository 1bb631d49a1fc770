//! STL rendering through `stl2pov` and POV-Ray.
//!
//! `stl2pov` turns the STL into a POV-Ray mesh declaration. A scene file
//! includes that declaration, binds it to `model` and appends the layout
//! template (camera, lights, floor). POV-Ray then renders the scene to PNG.

use std::path::{Path, PathBuf};

use brickhub_core::config::renderer::RendererConfig;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::ConversionError;
use crate::process::{ProcessRunner, path_arg, path_flag};

/// Renders STL files to PNG images.
#[derive(Debug, Clone)]
pub struct StlRenderer {
    config: RendererConfig,
    runner: ProcessRunner,
}

impl StlRenderer {
    /// Create a renderer; each external step is limited by `runner`'s timeout.
    pub fn new(config: RendererConfig, runner: ProcessRunner) -> Self {
        Self { config, runner }
    }

    /// Render `file` into `destination_dir/<stem>.png`.
    ///
    /// Intermediate files are removed afterwards unless
    /// `keep_intermediate` is configured.
    pub async fn render(
        &self,
        file: impl AsRef<Path>,
        destination_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, ConversionError> {
        self.render_with(
            file.as_ref(),
            destination_dir.as_ref(),
            self.config.keep_intermediate,
        )
        .await
    }

    /// Render with an explicit choice about keeping intermediate files.
    #[instrument(skip(self, file, destination_dir), fields(file = %file.display()))]
    pub async fn render_with(
        &self,
        file: &Path,
        destination_dir: &Path,
        keep_intermediate: bool,
    ) -> Result<PathBuf, ConversionError> {
        let layout = match tokio::fs::read_to_string(&self.config.layout_template).await {
            Ok(layout) => layout,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConversionError::LayoutMissing {
                    path: self.config.layout_template.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let work_dir = self
            .config
            .effective_work_dir()
            .join(Uuid::now_v7().simple().to_string());
        tokio::fs::create_dir_all(&work_dir).await?;
        tokio::fs::create_dir_all(destination_dir).await?;

        let result = self
            .run_pipeline(file, destination_dir, &work_dir, &layout)
            .await;

        if keep_intermediate {
            debug!(work_dir = %work_dir.display(), "Keeping intermediate files");
        } else if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            warn!(
                work_dir = %work_dir.display(),
                error = %e,
                "Failed to clean up render work directory"
            );
        }

        result
    }

    async fn run_pipeline(
        &self,
        file: &Path,
        destination_dir: &Path,
        work_dir: &Path,
        layout: &str,
    ) -> Result<PathBuf, ConversionError> {
        let stem = file_stem(file);

        let mesh_file = self.convert_stl_to_pov(file, work_dir, &stem).await?;
        let scene_file = Self::write_scene(file, &mesh_file, work_dir, &stem, layout).await?;

        let image = destination_dir.join(format!("{stem}.png"));
        let output = self
            .runner
            .run(&self.config.povray_path, self.povray_arguments(&scene_file, &image))
            .await
            .map_err(|e| ConversionError::tool_failed(file, "PNG", e))?;

        if !tokio::fs::try_exists(&image).await? {
            return Err(ConversionError::converting_failed(file, "PNG"));
        }

        info!(
            image = %image.display(),
            elapsed_ms = output.duration.as_millis() as u64,
            "STL rendered"
        );
        Ok(image)
    }

    /// Run `stl2pov` and store its mesh declaration as `<stem>.inc`.
    async fn convert_stl_to_pov(
        &self,
        file: &Path,
        work_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, ConversionError> {
        let output = self
            .runner
            .run(&self.config.stl2pov_path, [path_arg(file)])
            .await
            .map_err(|e| ConversionError::tool_failed(file, "POV", e))?;

        if output.stdout.trim().is_empty() {
            return Err(ConversionError::converting_failed(file, "POV"));
        }

        let mesh_file = work_dir.join(format!("{stem}.inc"));
        tokio::fs::write(&mesh_file, output.stdout.as_bytes()).await?;
        Ok(mesh_file)
    }

    /// Write `<stem>.pov`, binding the declared mesh to `model`.
    async fn write_scene(
        file: &Path,
        mesh_file: &Path,
        work_dir: &Path,
        stem: &str,
        layout: &str,
    ) -> Result<PathBuf, ConversionError> {
        let mesh = tokio::fs::read_to_string(mesh_file).await?;
        let name = declared_mesh_name(&mesh)
            .ok_or_else(|| ConversionError::converting_failed(file, "POV"))?;

        let scene_file = work_dir.join(format!("{stem}.pov"));
        tokio::fs::write(&scene_file, scene_source(mesh_file, name, layout)).await?;
        Ok(scene_file)
    }

    /// POV-Ray arguments rendering `scene` into `image`.
    pub fn povray_arguments(&self, scene: &Path, image: &Path) -> Vec<String> {
        vec![
            path_flag("+I", scene),
            path_flag("+O", image),
            "+FN".to_string(),
            format!("+W{}", self.config.width),
            format!("+H{}", self.config.height),
            format!("+Q{}", self.config.quality),
            format!("+A{}", self.config.antialias),
            "-D".to_string(),
        ]
    }
}

/// Name declared by the first `#declare <name> = mesh` statement.
pub fn declared_mesh_name(source: &str) -> Option<&str> {
    source.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix("#declare")?;
        let (name, value) = rest.split_once('=')?;
        let name = name.trim();
        let is_mesh = value.trim_start().starts_with("mesh");
        (is_mesh && !name.is_empty()).then_some(name)
    })
}

/// Scene language version; POV-Ray requires it before any other statement.
const POV_VERSION: &str = "3.7";

/// Scene source: include the mesh, bind it to `model`, append the layout.
fn scene_source(mesh_file: &Path, mesh_name: &str, layout: &str) -> String {
    format!(
        "#version {POV_VERSION};\n#include \"{}\"\n#declare model = {mesh_name};\n\n{layout}",
        mesh_file.display()
    )
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string())
}
