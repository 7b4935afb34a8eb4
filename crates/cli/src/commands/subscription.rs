//! Shop subscription: first payment with setup, and renewal.
//!
//! Payment itself happens in the gateway's checkout. `create`/`renew` print the
//! gateway order to pay; `setup`/`confirm-renewal` submit what the gateway
//! returned.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::Subcommand;
use drovo_client::Store;
use drovo_client::api::types::{GatewayOrder, PaymentConfirmation, ShopSetup};
use drovo_core::{Phone, SubscriptionPlan};

use super::owner::read_image;
use super::{parse_email, print_message};

#[derive(Subcommand)]
pub enum SubscribeAction {
    /// Create the payment for a new shop's first plan
    Create {
        /// Plan price in rupees (99, 149, 299, 599)
        #[arg(short, long, default_value = "99")]
        plan: SubscriptionPlan,
    },
    /// Submit the shop details with the first payment
    Setup {
        #[arg(short, long)]
        plan: SubscriptionPlan,

        /// Shop name (defaults to the one given at sign-up)
        #[arg(short, long)]
        name: Option<String>,

        /// Shop email (defaults to the one given at sign-up)
        #[arg(short, long)]
        email: Option<String>,

        /// 10 digit phone number
        #[arg(long)]
        phone: String,

        #[arg(long)]
        address: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Shop banner image
        #[arg(long)]
        image: PathBuf,

        #[command(flatten)]
        payment: PaymentArgs,
    },
    /// Create the payment to renew the plan
    Renew {
        #[arg(short, long, default_value = "99")]
        plan: SubscriptionPlan,
    },
    /// Submit a completed renewal payment
    ConfirmRenewal {
        #[arg(short, long)]
        plan: SubscriptionPlan,

        #[command(flatten)]
        payment: PaymentArgs,
    },
}

/// What the gateway returns after payment.
#[derive(clap::Args)]
pub struct PaymentArgs {
    #[arg(long)]
    order_id: String,

    #[arg(long)]
    payment_id: String,

    #[arg(long)]
    signature: String,
}

impl From<PaymentArgs> for PaymentConfirmation {
    fn from(args: PaymentArgs) -> Self {
        Self {
            razorpay_order_id: args.order_id,
            razorpay_payment_id: args.payment_id,
            razorpay_signature: args.signature,
        }
    }
}

/// `drovo plans`
pub fn plans() {
    for plan in SubscriptionPlan::ALL {
        println!("{:>4}  {plan}", plan.code());
    }
}

fn print_gateway_order(order: &GatewayOrder) {
    println!("Gateway order: {}", order.id);
    #[allow(clippy::cast_precision_loss)]
    let rupees = order.amount as f64 / 100.0;
    println!("Amount:        {rupees:.2} {}", order.currency);
}

/// `drovo subscribe ...`
pub async fn run(store: &mut Store, action: SubscribeAction) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();

    match action {
        SubscribeAction::Create { plan } => {
            let order = store.api().create_setup_payment(&token, plan).await;
            print_gateway_order(&store.observe(order)?);
            println!("Pay in the gateway checkout, then run `drovo subscribe setup`.");
        }
        SubscribeAction::Setup {
            plan,
            name,
            email,
            phone,
            address,
            lat,
            lng,
            image,
            payment,
        } => {
            let name = name
                .or_else(|| store.session().shop_name())
                .ok_or("shop name is required")?;
            let email = email
                .or_else(|| store.session().shop_email())
                .ok_or("shop email is required")?;
            let setup = ShopSetup {
                name,
                email: parse_email(&email)?,
                phone: Phone::parse(&phone)?,
                address,
                latitude: lat,
                longitude: lng,
                plan,
                image: read_image(&image)?,
            };
            let result = store.api().complete_setup(setup, &payment.into()).await;
            print_message(
                store.observe(result)?,
                "Payment successful! Shop setup completed.",
            );
            store.forget_shop_signup()?;
        }
        SubscribeAction::Renew { plan } => {
            let order = store.api().create_renewal_payment(&token, plan).await;
            print_gateway_order(&store.observe(order)?);
            println!("Pay in the gateway checkout, then run `drovo subscribe confirm-renewal`.");
        }
        SubscribeAction::ConfirmRenewal { plan, payment } => {
            let result = store
                .api()
                .verify_renewal(&token, plan, &payment.into())
                .await;
            print_message(store.observe(result)?, "Subscription renewed successfully!");
        }
    }
    Ok(())
}
