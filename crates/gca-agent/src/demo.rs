//! Offline provider for demonstrations and smoke tests.
//!
//! Answers every request with the same Angular card component, rendered from the token
//! set so that it passes validation for any valid tokens. No network, no API key.

use crate::provider::{LlmProvider, LlmResponse, ProviderError};
use gca_core::DesignTokenSet;
use gca_guard::Prompt;

pub struct DemoProvider {
    code: String,
}

impl DemoProvider {
    pub const MODEL_NAME: &str = "demo-fixture";

    pub fn new(tokens: &DesignTokenSet) -> Self {
        Self {
            code: render_fixture(tokens),
        }
    }

    /// The fixed completion this provider returns.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl LlmProvider for DemoProvider {
    fn complete(&self, _prompt: &Prompt, _temperature: f32) -> Result<LlmResponse, ProviderError> {
        // Fenced like a real model reply so the fence stripping path is exercised.
        Ok(LlmResponse::text(format!("```typescript\n{}\n```", self.code)))
    }

    fn model_name(&self) -> &str {
        Self::MODEL_NAME
    }
}

fn render_fixture(tokens: &DesignTokenSet) -> String {
    let primary = tokens.primary_color();
    let surface = tokens.secondary_color().unwrap_or(primary);
    let text = tokens
        .neutral_colors()
        .iter()
        .map(String::as_str)
        .find(|c| !c.eq_ignore_ascii_case(surface))
        .unwrap_or(primary);
    let radius = tokens.border_radius();
    let font = tokens.font_family();
    let spacing = tokens.spacing().unwrap_or(radius);

    format!(
        r#"import {{ Component }} from '@angular/core';
import {{ CommonModule }} from '@angular/common';

@Component({{
  selector: 'app-feature-card',
  standalone: true,
  imports: [CommonModule],
  template: `
    <section class="card">
      <h2 class="card-title">{{{{ title }}}}</h2>
      <p class="card-body">{{{{ body }}}}</p>
      <button class="card-action" (click)="onAction()">{{{{ actionLabel }}}}</button>
    </section>
  `,
  styles: [`
    :host {{
      font-family: '{font}', sans-serif;
    }}
    .card {{
      background: {surface};
      border: 1px solid {primary};
      border-radius: {radius};
      padding: {spacing};
    }}
    .card-title {{
      color: {primary};
      margin: 0 0 {spacing};
    }}
    .card-body {{
      color: {text};
      margin: 0 0 {spacing};
    }}
    .card-action {{
      background: {primary};
      color: {text};
      border: none;
      border-radius: {radius};
      padding: {spacing};
      font-family: '{font}', sans-serif;
      cursor: pointer;
    }}
  `]
}})
export class FeatureCardComponent {{
  title: string = 'Feature';
  body: string = 'A short description of the feature.';
  actionLabel: string = 'Learn more';

  onAction(): void {{
    console.log('Feature card action', this.title);
  }}
}}"#
    )
}
