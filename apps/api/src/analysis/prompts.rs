// Prompt constants for resume-vs-job analysis.
// Templates are filled with `str::replace`; every placeholder is listed above its template.

/// System prompt for both schema variants.
pub const ANALYSIS_SYSTEM: &str = "You are an ATS (Applicant Tracking System) analyzer. \
    Compare the RESUME with the JOB DESCRIPTION and return VALID JSON ONLY.";

/// Simple variant. Replace: {resume_text}, {job_description}
pub const SIMPLE_PROMPT_TEMPLATE: &str = r#"Return JSON in this exact format:
{
  "ats_score": number between 0 and 100,
  "missing_keywords": [string],
  "strengths": [string],
  "suggestions": [string]
}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

/// Scored-breakdown variant.
/// Replace: {candidate_guidance}, {target_stack}, {resume_text}, {job_description}
pub const BREAKDOWN_PROMPT_TEMPLATE: &str = r#"Return JSON in this exact format:
{
  "ats_score": number between 0 and 100,
  "score_breakdown": {
    "skills_match": number between 0 and 25,
    "project_impact": number between 0 and 25,
    "tools_frameworks": number between 0 and 25,
    "role_fit": number between 0 and 25
  },
  "missing_keywords": [string],
  "strengths": [string],
  "suggestions": [string]
}

SCORING RULES:
- skills_match: overlap between the resume's skills and the job's required skills
- project_impact: evidence of shipped work and measurable outcomes
- tools_frameworks: hands-on use of the tools, languages and frameworks the job names
- role_fit: seniority, domain and responsibilities compared with the role
- ats_score MUST equal the sum of the four breakdown values

CANDIDATE LEVEL:
{candidate_guidance}

TARGET STACK (weight these technologies higher when present in the job):
{target_stack}

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

pub const FRESHER_GUIDANCE: &str = "Fresher / early career. Weigh academic, personal and \
    internship projects as project impact. Do not penalize short professional history.";

pub const EXPERIENCED_GUIDANCE: &str = "Experienced professional. Weigh production ownership, \
    scope and measurable business impact. Penalize vague, unquantified claims.";

pub const NO_TARGET_STACK: &str = "None specified";
