use clap::Parser;
use crop_advisor::adapters::{ChatCompletionClient, IpLocator, ReverseGeocoder, WeatherClient};
use crop_advisor::config::{Command, LocationArgs, OutputArgs};
use crop_advisor::core::ConfigProvider;
use crop_advisor::core::engine::ResolvedConditions;
use crop_advisor::domain::model::{Report, Resolution, SoilConditions, SuitabilityVerdict};
use crop_advisor::utils::error::ErrorSeverity;
use crop_advisor::utils::{logger, validation::Validate};
use crop_advisor::{
    AdvisorClient, AdvisorEngine, CliConfig, CropCatalog, CropError, DistrictTable, LocalStorage,
    LocationService,
};

type Engine = AdvisorEngine<AdvisorClient, LocationService, LocalStorage>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env 不存在時直接略過
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting crop-advisor");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let settings = match cli.validate().and_then(|_| cli.settings()) {
        Ok(settings) => settings,
        Err(e) => exit_with(e),
    };
    if let Err(e) = settings.validate() {
        exit_with(e);
    }

    let engine = match build_engine(&settings) {
        Ok(engine) => engine,
        Err(e) => exit_with(e),
    };

    if let Err(e) = run(&engine, &cli.command).await {
        exit_with(e);
    }

    Ok(())
}

fn exit_with(e: CropError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ crop-advisor failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn build_engine<C: ConfigProvider>(config: &C) -> crop_advisor::Result<Engine> {
    let catalog = CropCatalog::from_path(config.crops_path())?;

    // 區域表讀不到時仍可手動輸入
    let districts = DistrictTable::from_path(config.districts_path()).unwrap_or_else(|e| {
        tracing::warn!(
            "⚠️ District table {} unavailable ({}); location lookup will fall back to manual input",
            config.districts_path(),
            e
        );
        DistrictTable::default()
    });

    let client = reqwest::Client::new();
    let advisor = AdvisorClient::new(ChatCompletionClient::new(
        client.clone(),
        config.advisor_endpoint(),
        config.advisor_api_key().map(str::to_string),
        config.advisor_model(),
    ));
    let locator = LocationService::new(
        IpLocator::new(client.clone(), config.ip_lookup_endpoint()),
        ReverseGeocoder::new(client.clone(), config.geocode_endpoint(), config.user_agent()),
        WeatherClient::new(
            client,
            config.weather_endpoint(),
            config.weather_api_key().map(str::to_string),
        ),
        districts,
    );
    let storage = LocalStorage::new(config.output_path().to_string());

    Ok(AdvisorEngine::new(catalog, advisor, locator, storage)
        .with_output(config.output_path(), config.report_filename()))
}

async fn run(engine: &Engine, command: &Command) -> crop_advisor::Result<()> {
    let default_soil = engine
        .catalog()
        .soil_types()
        .first()
        .map(|s| s.to_string())
        .unwrap_or_default();

    match command {
        Command::Suggest {
            conditions,
            location,
            output,
        } => {
            let manual = conditions.to_conditions(&default_soil);
            let resolved = resolve(engine, manual, location).await;
            let suggestion = engine
                .suggest(resolved.conditions, !output.no_advice)
                .await;

            println!(
                "✅ Top {} crop suggestions based on your input:",
                suggestion.matches.len()
            );
            println!();
            println!("{}", suggestion.report.match_data.as_deref().unwrap_or_default());
            println!();
            println!("🤖 AI Suggestion to Improve Yield:");
            println!("{}", suggestion.report.advice);

            finish(engine, &suggestion.report, output).await
        }
        Command::Info { crop, output } => {
            let info = engine.crop_info(crop, !output.no_advice).await?;

            println!("🌾 {}", info.crop.name);
            println!("  Soil: {}", info.crop.soil_list());
            println!("  Moisture Level: {}%", info.crop.ideal_moisture_percent);
            println!("  Temperature: {}", info.crop.temperature_label());
            println!(
                "  Rainfall: {}",
                info.crop.rainfall_need.as_deref().unwrap_or("n/a")
            );
            println!();
            println!("🤖 AI Fertilizer Suggestion:");
            println!("{}", info.report.advice);

            finish(engine, &info.report, output).await
        }
        Command::Check {
            crop,
            conditions,
            location,
            output,
        } => {
            let manual = conditions.to_conditions(&default_soil);
            let resolved = resolve(engine, manual, location).await;
            let check = engine
                .check(crop, resolved.conditions, !output.no_advice)
                .await?;

            println!("📊 Suitability Match % for {}: {}%", check.crop.name, check.score);
            match check.verdict {
                SuitabilityVerdict::Suitable => println!("✅ {}", check.verdict),
                SuitabilityVerdict::NotSuitable => println!("❌ {}", check.verdict),
            }
            println!();
            println!("🤖 AI Suggestions for Improvement:");
            println!("{}", check.report.advice);

            finish(engine, &check.report, output).await
        }
        Command::Locate { location } => {
            let resolved = resolve(
                engine,
                SoilConditions::new(default_soil, 0.0, 0.0),
                &LocationArgs {
                    locate: true,
                    ..location.clone()
                },
            )
            .await;
            if let Some(Resolution::Found(reading)) = resolved.resolution {
                println!("✅ Location Detected: {}", reading.district);
                println!("  Coordinates: {}", reading.coordinates);
                println!("  Soil Type: {}", reading.soil_type);
                println!("  Moisture Level: {}%", reading.moisture);
                println!("  Temperature: {}°C", reading.temperature);
            }
            Ok(())
        }
        Command::Catalog => {
            let catalog = engine.catalog();
            println!("🌾 {} crops:", catalog.len());
            for crop in catalog.crops() {
                println!(
                    "  {:<16} soil: {:<30} moisture: {:>5}%  temp: {}",
                    crop.name,
                    crop.soil_list(),
                    crop.ideal_moisture_percent,
                    crop.temperature_label()
                );
            }
            println!();
            println!("🪨 Soil types: {}", catalog.soil_types().join(", "));
            Ok(())
        }
    }
}

async fn resolve(
    engine: &Engine,
    manual: SoilConditions,
    location: &LocationArgs,
) -> ResolvedConditions {
    let resolved = engine
        .resolve_conditions(manual, location.wants_location(), location.coordinates())
        .await;

    if let Some(Resolution::NotFound(reason)) = &resolved.resolution {
        eprintln!("⚠️ Could not fetch complete data for this location: {}", reason);
        eprintln!("💡 Using the values given on the command line instead");
    }
    resolved
}

async fn finish(engine: &Engine, report: &Report, output: &OutputArgs) -> crop_advisor::Result<()> {
    if output.no_report {
        return Ok(());
    }
    let path = engine.save_report(report).await?;
    tracing::info!("📁 Report saved to: {}", path);
    println!();
    println!("📄 Report saved to: {}", path);
    Ok(())
}
