use crate::infra::{
    parse_attachment_kind, InMemoryApplicationRepository, InMemoryBlobStore, LogNotifier,
};
use clap::Args;
use delegate_intake::error::AppError;
use delegate_intake::workflows::registration::{
    ApplicationIdGenerator, ApplicationRepository, Attachment, AttachmentKind,
    CommitteePreferences, EssayResponses, ExperienceDetails, ExperienceLevel, FeeAgreement,
    FeeCalculator, FieldValidator, IdentityDetails, PaymentDetails, SequentialIdGenerator,
    StepData, SubmissionCoordinator, SubmissionOutcome, WizardController, WizardStep,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct FeeArgs {
    /// Discount tag to apply (IELTS, SAT). Repeat for several.
    #[arg(long = "tag")]
    pub(crate) tags: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Simulate a storage outage for one attachment (photo, ielts, sat).
    #[arg(long, value_parser = parse_attachment_kind)]
    pub(crate) fail_upload: Option<AttachmentKind>,
}

pub(crate) fn run_fee_quote(args: FeeArgs) -> Result<(), AppError> {
    let breakdown = FeeCalculator.calculate(&args.tags);
    let applied: Vec<&str> = FeeCalculator::recognised(&args.tags)
        .into_iter()
        .map(|tag| tag.as_str())
        .collect();

    println!("Registration fee");
    println!("- Base fee: {}", breakdown.original_fee);
    if applied.is_empty() {
        println!("- Discounts: none");
    } else {
        println!("- Discounts: {} (-{})", applied.join(", "), breakdown.discount);
    }
    println!("- Total due: {}", breakdown.final_fee);
    if breakdown.exceeds_advertised_cap() {
        println!("  Warning: discount is above the advertised maximum");
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryBlobStore::failing_on(args.fail_upload));
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let notifier = Arc::new(LogNotifier::default());
    let ids: Arc<dyn ApplicationIdGenerator> = Arc::new(SequentialIdGenerator::new("DEMO"));
    let coordinator =
        SubmissionCoordinator::new(store.clone(), repository.clone(), notifier.clone(), ids);
    let mut wizard = WizardController::new(coordinator);

    println!("Delegate registration demo");
    if let Some(kind) = args.fail_upload {
        println!("(storage will reject the {kind})");
    }

    println!("\nTrying to continue with an empty form");
    for issue in FieldValidator::check_step(wizard.step(), wizard.form()) {
        println!("  - {}: {}", issue.field, issue.message);
    }
    if !wizard.advance() {
        println!("  Still on {}", wizard.step());
    }

    println!("\nFilling in the wizard");
    for data in demo_steps() {
        let step = data.step();
        wizard.edit(data);
        if step == WizardStep::Essays {
            let feedback = FieldValidator::essay_feedback(&wizard.form().essays.motivation);
            println!(
                "  Motivation essay: {} of {} suggested words",
                feedback.words, feedback.suggested
            );
        }
        if step == WizardStep::Payment {
            println!("  Completed {step}; ready to submit");
        } else if wizard.advance() {
            println!("  Completed {step} -> now on {}", wizard.step());
        } else {
            println!("  {step} is still incomplete");
        }
    }
    println!("  UI effects queued: {}", wizard.drain_effects().len());

    let fee = FeeCalculator.calculate(&wizard.form().payment.discount_tags);
    println!(
        "\nFee: {} - {} = {}",
        fee.original_fee, fee.discount, fee.final_fee
    );

    println!("\nSubmitting");
    let outcome = wizard.submit().await;
    println!("  {}", outcome.message());
    println!("  Objects in storage: {}", store.object_count());
    for notice in notifier.notices() {
        println!("  Toast [{:?}]: {}", notice.level, notice.message);
    }

    if let SubmissionOutcome::Submitted(stored) = &outcome {
        println!("  Wizard now on {}", wizard.step());
        let lookup = repository.fetch(&stored.record.application_id).await;
        match lookup {
            Ok(Some(found)) => match serde_json::to_string_pretty(&found.status_view()) {
                Ok(json) => println!("  Public status payload:\n{}", json),
                Err(err) => println!("  Public status payload unavailable: {}", err),
            },
            Ok(None) => println!("  Repository lookup returned no record"),
            Err(err) => println!("  Repository unavailable: {}", err),
        }
    } else {
        println!("  Wizard stays on {}", wizard.step());
    }

    Ok(())
}

fn demo_steps() -> Vec<StepData> {
    vec![
        StepData::Identity(IdentityDetails {
            full_name: "Sofia Marin".to_string(),
            email: "sofia@example.org".to_string(),
            social_handle: "@sofia.mun".to_string(),
            institution: "Liceo Cervantes".to_string(),
            birth_date: "2008-05-09".to_string(),
            location: "Valencia".to_string(),
            phone: String::new(),
            photo: Some(Attachment::new("sofia.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF])),
        }),
        StepData::Experience(ExperienceDetails {
            level: Some(ExperienceLevel::Beginner),
            previous_conferences: "School MUN club".to_string(),
            portfolio_link: String::new(),
        }),
        StepData::Committees(CommitteePreferences {
            first: "UNESCO".to_string(),
            second: "UNHCR".to_string(),
            third: "UNGA".to_string(),
        }),
        StepData::Essays(EssayResponses {
            motivation: "I want to learn how consensus is built between delegations.".to_string(),
            contribution: "Careful research and a willingness to draft clauses.".to_string(),
        }),
        StepData::Payment(PaymentDetails {
            fee_agreement: Some(FeeAgreement::Agree),
            discount_tags: ["IELTS".to_string()].into_iter().collect(),
            ielts_proof: Some(Attachment::new(
                "ielts.pdf",
                "application/pdf",
                b"%PDF-1.4".to_vec(),
            )),
            sat_proof: None,
            confirmed: true,
        }),
    ]
}
