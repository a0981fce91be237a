//! Research prompt and offline report templates
//!
//! `ResearchPrompt` builds the prompts sent to the AI collaborator;
//! `ReportTemplate` produces the offline section bodies used by the fast
//! strategy, which never makes an AI round trip.

use crate::research::context::ProjectContext;
use crate::research::strategy::ResearchKind;

/// Templates for prompts sent to the AI agent
pub struct ResearchPrompt;

impl ResearchPrompt {
    /// System instructions shared by all structured research calls
    pub fn analyst_instructions() -> &'static str {
        "You are an expert research analyst. Provide comprehensive, detailed \
analysis with citations and specific recommendations."
    }

    /// Prompt for one structured research type
    pub fn structured(kind: ResearchKind, context: &ProjectContext) -> String {
        match kind {
            ResearchKind::Technical => format!(
                r#"Perform a comprehensive technical analysis for {name}:

1. **Architecture Patterns**: Research best-practice architecture patterns, scalability considerations and design principles
2. **Technology Stack Analysis**: Analyze current trends, performance characteristics and ecosystem maturity for the proposed technologies
3. **Implementation Approaches**: Compare implementation strategies, their trade-offs and recommended patterns
4. **Security Considerations**: Identify security best practices, common vulnerabilities and compliance requirements

Focus on actionable insights for the project context: {context}"#,
                name = context.project_name,
                context = context.project_context,
            ),
            ResearchKind::Market => format!(
                r#"Conduct comprehensive market research for {name}:

1. **Market Landscape**: Analyze current market size, growth trends and key segments
2. **Competitive Analysis**: Identify direct and indirect competitors, their strengths, weaknesses and positioning
3. **Industry Trends**: Research emerging trends and market shifts affecting the domain
4. **Market Opportunities**: Highlight gaps, opportunities and differentiation strategies

Project context: {context}"#,
                name = context.project_name,
                context = context.project_context,
            ),
            ResearchKind::Risk => format!(
                r#"Perform a comprehensive risk assessment for {name}:

1. **Technical Risks**: Identify technology-related risks, dependencies and potential failure points
2. **Security Risks**: Analyze security threats, vulnerabilities and compliance risks
3. **Operational Risks**: Assess deployment, maintenance and operational challenges
4. **Mitigation Strategies**: Provide specific risk mitigation approaches and contingency plans

Project details: {context}"#,
                name = context.project_name,
                context = context.project_context,
            ),
            ResearchKind::Stakeholder => format!(
                r#"Conduct a stakeholder analysis for {name}:

1. **User Personas**: Define primary user segments, their needs, behaviors and pain points
2. **Business Stakeholders**: Identify key business stakeholders, their priorities and success criteria
3. **Technical Stakeholders**: Analyze technical team requirements and constraints
4. **Requirements Analysis**: Research functional and non-functional requirements from stakeholder perspectives

Project context: {context}"#,
                name = context.project_name,
                context = context.project_context,
            ),
        }
    }

    /// Wrap a custom prompt with project context for the deep strategy
    pub fn deep(custom_prompt: &str, context: &ProjectContext, story_details: &str) -> String {
        format!(
            r#"# Deep Research Request

## Project Context
**Project:** {name}
**Story ID:** {story_id}

## Project Details
{details}

## Research Instructions
{prompt}

Please conduct comprehensive research addressing the above instructions. Use
the deep research tool to gather current, authoritative information from
multiple sources. Provide detailed analysis with specific citations and
actionable recommendations."#,
            name = context.project_name,
            story_id = context.story_id,
            details = story_details,
            prompt = custom_prompt,
        )
    }
}

/// Offline report bodies for the fast (template-based) strategy
pub struct ReportTemplate;

impl ReportTemplate {
    pub fn for_kind(kind: ResearchKind, context: &ProjectContext) -> String {
        match kind {
            ResearchKind::Technical => Self::technical(context),
            ResearchKind::Market => Self::market(context),
            ResearchKind::Risk => Self::risk(context),
            ResearchKind::Stakeholder => Self::stakeholder(context),
        }
    }

    pub fn technical(context: &ProjectContext) -> String {
        format!(
            r#"## Architecture Analysis
Recommended starting architecture for {name}:

- **Frontend**: React/TypeScript for a modern web interface
- **Backend**: .NET Core Web API for enterprise integration
- **AI Integration**: Azure OpenAI Service with retrieval-augmented generation
- **Database**: Azure SQL Database
- **Authentication**: Azure AD for access control

## Implementation Approach
- Phase 1: Core platform functionality
- Phase 2: AI integration with basic assistant features
- Phase 3: Advanced analytics and automation

## Security Considerations
- Zero-trust architecture with managed identities
- Data isolation and compliance (GDPR, SOC 2)
- API rate limiting and monitoring

Context: {context}"#,
            name = context.project_name,
            context = context.project_context,
        )
    }

    pub fn market(context: &ProjectContext) -> String {
        format!(
            r#"## Market Landscape
The market segment for {name} is growing, driven by digital transformation
and AI adoption.

### Key Trends
1. AI-powered workflow automation is the fastest-growing capability
2. Enterprises expect real-time analytics and attribution
3. Deep platform-ecosystem integration is a differentiator

### Positioning Opportunities
1. Tighter Microsoft-ecosystem integration than incumbents
2. Enterprise focus: organizations with complex partner networks
3. AI-first feature set rather than bolted-on assistants

Context: {context}"#,
            name = context.project_name,
            context = context.project_context,
        )
    }

    pub fn risk(context: &ProjectContext) -> String {
        format!(
            r#"## Technical Risks
1. **AI model dependencies** - upstream API changes can break functionality;
   mitigate with an abstraction layer and fallback options
2. **Data privacy** - exposure or compliance violations; mitigate with
   zero-trust design and regular audits
3. **Integration complexity** - phased rollout with a dedicated test environment

## Business Risks
1. **Competition** - incumbents shipping similar AI features
2. **Adoption** - users resistant to AI-driven tooling; plan a gradual rollout

## Mitigation Strategies
Robust testing and monitoring, phased delivery, proactive compliance review.

Project: {name}. Context: {context}"#,
            name = context.project_name,
            context = context.project_context,
        )
    }

    pub fn stakeholder(context: &ProjectContext) -> String {
        format!(
            r#"## Stakeholder Overview
- **Primary users**: operators of {name} and their partner organizations
- **Business stakeholders**: sponsors measuring adoption and revenue impact
- **Technical stakeholders**: platform team owning integration and operations

## Requirements Highlights
Functional coverage of onboarding and reporting workflows; non-functional
emphasis on auditability and access control.

Context: {context}"#,
            name = context.project_name,
            context = context.project_context,
        )
    }
}
