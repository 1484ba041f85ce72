use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use unity_scene_editor::{EditResult, EditorConfig, GuidCache, SceneEditor, SUPPORTED_EXTENSIONS};

#[derive(Parser)]
#[command(name = "unity_scene_editor")]
#[command(about = "按格式保留的方式编辑 Unity 场景与预制体文件")]
#[command(version = "0.1.0")]
struct Cli {
    /// 场景/预制体文件路径
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// 项目根目录（默认从文件位置向上查找包含 Assets 的目录）
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// GUID 缓存 JSON（{ guid: 相对路径 }）
    #[arg(long, global = true)]
    guid_cache: Option<PathBuf>,

    /// 随机 id 种子（输出可复现）
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 创建 GameObject
    Create {
        name: String,
        /// 父对象（名称或 fileID）
        #[arg(long)]
        parent: Option<String>,
    },
    /// 删除 GameObject 及其子树
    Delete { target: String },
    /// 复制 GameObject 及其子树
    Duplicate {
        target: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// 改变父节点（不指定 --parent 时移到根）
    Reparent {
        target: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// 添加组件（内置类型名、脚本 GUID、脚本路径或脚本名）
    AddComponent { target: String, component: String },
    /// 按 fileID 删除组件
    RemoveComponent { component_id: String },
    /// 复制组件到另一个 GameObject
    CopyComponent { component_id: String, target: String },
    /// 写入属性
    Set {
        target: String,
        path: String,
        value: String,
        /// 组件类型名（不指定时写入目标对象本身）
        #[arg(long)]
        component: Option<String>,
        /// 对象引用（如 "{fileID: 123}"），优先于 value
        #[arg(long)]
        reference: Option<String>,
    },
    /// 读取属性
    Get {
        target: String,
        path: String,
        #[arg(long)]
        component: Option<String>,
    },
    /// 以当前预制体为源创建变体
    CreateVariant {
        output: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// 展开预制体实例（fileID 或显示名称）
    Unpack { target: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = cli.file.clone().context("--file is required")?;
    validate_input(&file)?;

    let editor = build_editor(&cli, file)?;
    let result = run(&editor, cli.command);

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        bail!("{}", result.message);
    }
    Ok(())
}

/// 验证输入文件扩展名
fn validate_input(file: &Path) -> Result<()> {
    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if !SUPPORTED_EXTENSIONS.iter().any(|&ext| Some(ext) == extension.as_deref()) {
        bail!("输入文件必须是 .unity、.prefab 或 .asset 文件: {}", file.display());
    }
    Ok(())
}

fn build_editor(cli: &Cli, file: PathBuf) -> Result<SceneEditor> {
    let config = EditorConfig {
        project_root: cli.project_root.clone(),
        id_seed: cli.seed,
        create_parent_dirs: true,
    };
    let mut editor = SceneEditor::new(file).with_config(config);

    if let Some(cache_path) = &cli.guid_cache {
        let mut cache = GuidCache::load_json(cache_path)
            .with_context(|| format!("加载 GUID 缓存失败: {}", cache_path.display()))?;
        if let Some(root) = &cli.project_root {
            cache = cache.with_root(root.clone());
        }
        editor = editor.with_guid_resolver(cache);
    }
    Ok(editor)
}

fn run(editor: &SceneEditor, command: Command) -> EditResult {
    match command {
        Command::Create { name, parent } => editor.create_game_object(&name, parent.as_deref()),
        Command::Delete { target } => editor.delete_game_object(&target),
        Command::Duplicate { target, name } => editor.duplicate_game_object(&target, name.as_deref()),
        Command::Reparent { target, parent } => editor.reparent_game_object(&target, parent.as_deref()),
        Command::AddComponent { target, component } => editor.add_component(&target, &component),
        Command::RemoveComponent { component_id } => editor.remove_component(&component_id),
        Command::CopyComponent { component_id, target } => editor.copy_component(&component_id, &target),
        Command::Set {
            target,
            path,
            value,
            component,
            reference,
        } => editor.set_property(&target, component.as_deref(), &path, &value, reference.as_deref()),
        Command::Get {
            target,
            path,
            component,
        } => editor.get_property(&target, component.as_deref(), &path),
        Command::CreateVariant { output, name } => editor.create_variant(&output, name.as_deref()),
        Command::Unpack { target } => editor.unpack_prefab_instance(&target),
    }
}
