//! Compiler timing instrumentation.
//!
//! Each compile that writes a `.timing` file gets a follow-up action that
//! runs this tool to parse it into a `.cta` summary. Once a target is
//! planned, the summaries are registered as outputs and, when there is more
//! than one, aggregated into a single per-target report.

use std::path::Path;

use anyhow::Result;

use crate::builder::action::ActionKind;
use crate::builder::args::quoted;
use crate::builder::graph::ActionGraph;
use crate::builder::toolchain::ToolchainEnvironment;
use crate::core::FileItem;

/// Extension of parsed timing summaries.
const TIMING_SUMMARY_EXTENSION: &str = "cta";

/// Add the action that parses one compile's timing file.
pub fn parse_timing_info_action(
    toolchain: &ToolchainEnvironment,
    source: &FileItem,
    timing_file: &FileItem,
    graph: &mut dyn ActionGraph,
) -> Result<FileItem> {
    let summary = timing_file.with_extension(TIMING_SUMMARY_EXTENSION);

    let mut action = graph.create_action(ActionKind::ParseTimingInfo);
    action.command_path = toolchain.build_tool_path().to_path_buf();
    action.arguments = vec![
        "-Mode=ParseMsvcTimingInfo".to_string(),
        format!("-TimingFile={}", quoted(timing_file.path())),
    ];
    if toolchain.settings().parse_timing_info_for_tracing {
        action.arguments.push("-Tracing".to_string());
    }
    action.status_description = timing_file.file_name();
    action.command_description = "ParseTimingInfo".to_string();
    action.can_execute_remotely = true;
    action.can_execute_remotely_with_secondary = true;
    action.add_prerequisite(source.clone());
    action.add_prerequisite(timing_file.clone());
    action.add_produced(summary.clone());

    graph.add_action(action.build())?;
    Ok(summary)
}

/// Register timing summaries as outputs and aggregate them per target.
///
/// Returns the aggregate summary when one was planned.
pub fn finalize_output(
    graph: &mut dyn ActionGraph,
    toolchain: &ToolchainEnvironment,
    target_name: &str,
    intermediate_dir: &Path,
) -> Result<Option<FileItem>> {
    if !toolchain.settings().wants_timing_files() {
        return Ok(None);
    }

    let summaries: Vec<FileItem> = graph
        .actions()
        .iter()
        .filter(|a| a.kind() == ActionKind::ParseTimingInfo)
        .flat_map(|a| a.produced_items().iter())
        .filter(|item| item.has_extension(TIMING_SUMMARY_EXTENSION))
        .cloned()
        .collect();

    for summary in &summaries {
        graph.add_output_item(summary.clone());
    }

    if summaries.len() <= 1 {
        return Ok(None);
    }

    let manifest_path = intermediate_dir.join(format!("{}TimingManifest.txt", target_name));
    let mut manifest: String = summaries
        .iter()
        .map(|s| s.path().display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    manifest.push('\n');
    graph.create_intermediate_text_file(&manifest_path, &manifest)?;

    let compile_timing = intermediate_dir.join(format!("{}.json", target_name));
    let aggregate = FileItem::new(intermediate_dir.join(format!("{}.cta", target_name)));

    let mut action = graph.create_action(ActionKind::ParseTimingInfo);
    action.command_path = toolchain.build_tool_path().to_path_buf();
    action.arguments = vec![
        "-Mode=AggregateParsedTimingInfo".to_string(),
        format!("-Name={}", target_name),
        format!("-ManifestFile={}", manifest_path.display()),
        format!("-CompileTimingFile={}", compile_timing.display()),
    ];
    action.status_description = format!("Aggregating {} Timing File(s)", summaries.len());
    action.command_description = "AggregateTimingInfo".to_string();
    action.add_prerequisites(summaries);
    action.add_produced(aggregate.clone());

    graph.add_action(action.build())?;
    graph.add_output_item(aggregate.clone());

    tracing::debug!("aggregating timing info into {}", aggregate);
    Ok(Some(aggregate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::compile::compile_cpp_files;
    use crate::builder::toolchain::{CompilerKind, PlatformSettings};
    use crate::core::CompileEnvironment;
    use crate::test_support::ProjectFixture;

    fn timing_settings() -> PlatformSettings {
        PlatformSettings {
            compiler_trace: true,
            parse_timing_info_for_tracing: true,
            always_use_response_files: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_action() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, timing_settings());
        let mut graph = project.graph();
        let source = FileItem::new(project.path("Source/A.cpp"));
        let timing = FileItem::new(project.path("Intermediate/A.cpp.timing"));

        let summary = parse_timing_info_action(&tc, &source, &timing, &mut graph).unwrap();
        assert_eq!(summary, FileItem::new(project.path("Intermediate/A.cpp.cta")));

        let action = &graph.actions()[0];
        assert_eq!(action.command_path(), tc.build_tool_path());
        assert_eq!(action.arguments()[0], "-Mode=ParseMsvcTimingInfo");
        assert_eq!(action.arguments().last().unwrap(), "-Tracing");
        assert!(action.can_execute_remotely());
    }

    #[test]
    fn test_aggregate_for_several_files() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, timing_settings());
        let files = vec![
            project.source("Source/A.cpp", ""),
            project.source("Source/B.cpp", ""),
        ];
        let mut graph = project.graph();
        let out = project.output_dir("Core");
        compile_cpp_files(&tc, &CompileEnvironment::default(), &files, &out, "Core", &mut graph)
            .unwrap();

        let intermediate = project.path("Intermediate");
        let aggregate = finalize_output(&mut graph, &tc, "Game", &intermediate)
            .unwrap()
            .unwrap();
        assert_eq!(aggregate, FileItem::new(intermediate.join("Game.cta")));
        assert!(graph.outputs().contains(&aggregate));
        assert!(graph
            .outputs()
            .contains(&FileItem::new(out.join("A.cpp.cta"))));

        let manifest = project.read(&intermediate.join("GameTimingManifest.txt"));
        assert_eq!(manifest.lines().count(), 2);

        let action = graph.producer_of(&aggregate).unwrap();
        assert!(!action.can_execute_remotely());
        assert_eq!(action.prerequisite_items().len(), 2);
        graph.execution_order().unwrap();
    }

    #[test]
    fn test_single_file_is_not_aggregated() {
        let project = ProjectFixture::new();
        let tc = project.toolchain_with(CompilerKind::VisualStudio2019, timing_settings());
        let files = vec![project.source("Source/A.cpp", "")];
        let mut graph = project.graph();
        compile_cpp_files(
            &tc,
            &CompileEnvironment::default(),
            &files,
            &project.output_dir("Core"),
            "Core",
            &mut graph,
        )
        .unwrap();

        let aggregate = finalize_output(&mut graph, &tc, "Game", &project.path("Intermediate"));
        assert!(aggregate.unwrap().is_none());
        assert_eq!(graph.outputs().len(), 1);
    }
}
