//! Render staged recovery emails.
//!
//! Subject and copy escalate with the reminder stage; stage 3 carries the
//! fixed-percentage win-back discount. Both a plain-text and a minimal
//! HTML body are produced.

use trolley_core::{catalog::CatalogProduct, mail::OutboundEmail};

/// The stage-3 win-back incentive. Distinct from the storefront's general
/// coupon system.
#[derive(Debug, Clone)]
pub struct Discount {
  pub code:    String,
  pub percent: u8,
}

/// One displayable cart line: catalog data joined with the stored
/// quantity.
#[derive(Debug, Clone)]
pub struct RecoveryLine {
  pub product:  CatalogProduct,
  pub quantity: u32,
}

/// Everything needed to render one recovery email.
#[derive(Debug)]
pub struct RecoveryContext<'a> {
  /// Escalation stage being sent, `1..=3`.
  pub stage:           u8,
  pub recipient_email: &'a str,
  pub recipient_name:  Option<&'a str>,
  pub lines:           &'a [RecoveryLine],
  pub cart_total:      f64,
  pub store_name:      &'a str,
  /// Storefront base URL; the cart-resume link is derived from it.
  pub store_url:       &'a str,
  /// Present only at stage 3.
  pub discount:        Option<&'a Discount>,
}

fn subject(ctx: &RecoveryContext) -> String {
  match ctx.stage {
    1 => format!("You left something in your cart at {}", ctx.store_name),
    2 => format!("Still thinking it over? Your {} cart is waiting", ctx.store_name),
    _ => match ctx.discount {
      Some(d) => format!("Your cart is about to expire — take {}% off", d.percent),
      None => format!("Last chance to finish your {} order", ctx.store_name),
    },
  }
}

/// Build the message for one candidate record.
pub fn render_recovery_email(ctx: &RecoveryContext) -> OutboundEmail {
  let greeting_name = ctx.recipient_name.unwrap_or("there");
  let cart_url = format!("{}/cart", ctx.store_url.trim_end_matches('/'));

  let mut text = format!("Hi {greeting_name},\n\n");
  text.push_str(match ctx.stage {
    1 => "Looks like you left a few things behind. Your cart is saved and ready whenever you are.\n\n",
    2 => "Your cart is still waiting for you. Items sell out, so don't wait too long.\n\n",
    _ => "This is the last reminder before your cart expires.\n\n",
  });

  for line in ctx.lines {
    text.push_str(&format!(
      "  {} x {} — {:.2}\n",
      line.quantity, line.product.name, line.product.price
    ));
  }
  text.push_str(&format!("\nCart total: {:.2}\n", ctx.cart_total));

  if let Some(d) = ctx.discount {
    text.push_str(&format!(
      "\nUse code {} at checkout for {}% off your order.\n",
      d.code, d.percent
    ));
  }

  text.push_str(&format!("\nPick up where you left off: {cart_url}\n"));

  let mut rows = String::new();
  for line in ctx.lines {
    let image = line
      .product
      .image_url
      .as_deref()
      .map(|url| format!("<img src=\"{url}\" alt=\"\" width=\"48\">"))
      .unwrap_or_default();
    rows.push_str(&format!(
      "<tr><td>{image}</td><td>{} x {}</td><td>{:.2}</td></tr>",
      line.quantity, line.product.name, line.product.price
    ));
  }

  let discount_html = ctx
    .discount
    .map(|d| {
      format!(
        "<p>Use code <strong>{}</strong> at checkout for {}% off.</p>",
        d.code, d.percent
      )
    })
    .unwrap_or_default();

  let html = format!(
    "<p>Hi {greeting_name},</p>\
     <table>{rows}</table>\
     <p>Cart total: {:.2}</p>\
     {discount_html}\
     <p><a href=\"{cart_url}\">Return to your cart</a></p>",
    ctx.cart_total
  );

  OutboundEmail {
    to:        ctx.recipient_email.to_owned(),
    subject:   subject(ctx),
    text_body: text,
    html_body: Some(html),
  }
}
