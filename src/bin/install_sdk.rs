//! SDK provisioning entry point.
//!
//! Downloads and extracts the third-party SDK packages under `<root>/SDK`,
//! then stages their DLLs into `<root>/Bin/{Release64,Profile64,Debug64}`.
//! Runs with no arguments; the build root comes from `BUILD_MOUCA`, the
//! offline staging mirror from `MOUCA_SDK`, and `IS_TEAMCITY` switches the
//! console output to CI service messages.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mouca_setup::config::{self, Config};
use mouca_setup::manifest::{self, DllSpec, Package};
use mouca_setup::{install, output, stage};

#[derive(Parser)]
#[command(name = "install-sdk")]
#[command(about = "Provision the third-party SDK packages for the MouCaLab build")]
#[command(version)]
struct Cli {
    /// Build output root; SDK packages land in <root>/SDK
    #[arg(long, env = "BUILD_MOUCA")]
    output_root: Option<PathBuf>,

    /// Offline package staging directory, used instead of the remote drive
    #[arg(long, env = "MOUCA_SDK")]
    staging: Option<PathBuf>,

    /// Path to the extraction tool
    #[arg(long, default_value_os_t = config::default_tool_path())]
    tool: PathBuf,

    /// TOML manifest overriding the built-in package list
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Skip the Debug64 staging pass
    #[arg(long)]
    no_debug: bool,

    /// Emit TeamCity service messages (also enabled by IS_TEAMCITY)
    #[arg(long)]
    ci: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ci = cli.ci || std::env::var_os("IS_TEAMCITY").is_some();
    output::init(ci);

    match run(cli, ci) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, ci: bool) -> Result<()> {
    let root = match cli.output_root {
        Some(root) => root,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let sdk_root = root.join("SDK");

    let mut config = Config::new(&sdk_root).tool(cli.tool).ci(ci);
    if let Some(staging) = cli.staging {
        config = config.staging(staging);
    }

    let packages = match cli.manifest {
        Some(path) => manifest::load(&path)
            .with_context(|| format!("cannot load manifest {}", path.display()))?,
        None => sdk_packages(),
    };

    install::install_packages(&config, &packages, "SDK - Setup")?;
    stage::stage_dlls(&sdk_root, &packages, !cli.no_debug, "SDK - Copy")?;
    Ok(())
}

/// Third-party packages required by the engine build.
fn sdk_packages() -> Vec<Package> {
    vec![
        Package::new("assimp-5.0.0.rc1.7z")
            .remote("13T0WsgNH8Kl8eEiGeYMzv2yawFCJQZli")
            .dlls(DllSpec::new("assimp5.0.0rc1.dll", "assimp5.0.0rc1D.dll")),
        Package::new("Boost-1.72.0.7z").remote("1pl9Umsn_Durfc42msqnPCmWo6hHot2En"),
        Package::new("Boost-1.72.0-stage.7z")
            .remote("1slDcGzU8qyTbnNapK5OJi7Mo69ye8EUV")
            .marker("Boost-1.72.0/lib64"),
        Package::new("FreeImage-3.180.7z")
            .remote("1x8QCnw4X6xegu8OwLF6CqjB-H5G2_xT0")
            .dlls(DllSpec::new("FreeImage.dll", "FreeImaged.dll").subdir("Dist/x64")),
        Package::new("Freetype-2.10.2.7z").remote("1zF5L61Fo4m3alCdq1xHk_l0C_tJDsMYL"),
        Package::new("glfw-3.3.2.7z").remote("1AhjRGokc5o3BavC8kNUmS7Vd9q7pU18_"),
        Package::new("gli-0.8.2.0.7z").remote("1eqmp5Er6H0RHfUtWUsi87-qQOdWhCHE4"),
        Package::new("glm-0.9.8.5.7z").remote("1ThZEnM5KlpSfts_OOp8slHiKLpLjy5hN"),
        Package::new("googletest-1.10.0.7z")
            .remote("1I8tvgpFE03YUChGELMtFTpqfmuzo0g-Q")
            .dlls(DllSpec::new("gtest.dll", "gtestd.dll")),
        Package::new("imgui-1.79.7z").remote("1TXhxPLP7cfOn1oji8zFDY5wJTH6JM52v"),
        Package::new("KTX-Software-2.0.2.7z").remote("14BMn8iaKB2k2t0_5yAnECPxruXCQjWyl"),
        Package::new("openvr-1.11.11.7z")
            .remote("1rptiPRPQNDEJ8Et_K8q3T4kTvkv8A92O")
            .dlls(DllSpec::new("openvr_api.dll", "openvr_api.dll").subdir("bin/win64")),
        Package::new("sqlite-3.33.7z").remote("15Zv4Iy_l1mCext05ZuvPHaPXv7X37LJb"),
        Package::new("SteamWorksSDK-146.7z")
            .remote("1fmSY_sBH7SKa9r1eZDInCejV_nxbrFEN")
            .dlls(
                DllSpec::new("steam_api64.dll", "steam_api64.dll")
                    .subdir("redistributable_bin/win64"),
            ),
        Package::new("Vulkan-1.2.162.1.7z")
            .remote("1ChbuCNmqv0YxNlDcS_lTS4oL-Jklkm-u")
            .marker("VulkanSDK/1.2.162.1"),
        Package::new("xerces-c-3.2.2.7z")
            .remote("1heXsPWp28zHR8NFNThqaio8MMhLeoC-J")
            .dlls(DllSpec::new("xerces-c_3_2.dll", "xerces-c_3_2D.dll")),
        Package::new("include-0.01.7z")
            .remote("1NjNgJaoMr30gxn62C5nETMZFt9Z3_sdN")
            .marker("include/INCLUDE-0.01"),
    ]
}
