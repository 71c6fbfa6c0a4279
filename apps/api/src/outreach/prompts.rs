// All LLM prompt constants for the Outreach module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Profile analysis prompt template.
/// Replace `{target_role}`, `{job_description}`, `{location}`, `{profiles}` and
/// `{json_only}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"
You are a recruitment expert. Here is a list of LinkedIn search results for someone looking for the position of '{target_role}'.
Job description (context): {job_description}
Job location (context): {location}

Analyze each profile and return a strict JSON list. For each profile, identify:
1. The Name (extracted from the title).
2. The Current Role.
3. The "Potential Score" (0-100): Probability that this person could hire me or get me an interview.
4. The "Type": "Hiring Manager" (potential boss), "Recruiter" (HR), "Peer" (Colleague), or "Irrelevant".
5. A short "Reason" (one sentence) explaining why this contact is relevant.
6. The email address (extract from the snippet if available, look for patterns like "email", "contact", "@company.com", or any visible email format. If not found, leave empty "").
7. The LinkedIn URL.

Keep the "id" of each profile exactly as given below; it is used to match your answer back to the input.

Here are the profiles:
{profiles}

{json_only}
Format: [{"id": 0, "name": "...", "role": "...", "score": 80, "type": "...", "reason": "...", "link": "...", "email": "..."}]
"#;

/// Placeholder used when an optional context field is missing.
pub const NOT_PROVIDED: &str = "Not provided";

/// Outreach drafting prompt template.
/// Replace `{target_role}`, `{user_context}`, `{contact_name}`, `{contact_role}`
/// and `{contact_type}` before sending.
pub const DRAFT_PROMPT_TEMPLATE: &str = r#"
Role: You are a career coach helping a candidate write a genuine, warm, and professional cold email.

Task: Draft a LinkedIn note (max 300 chars) and a short cold email.

Input Data:
- Target Role: {target_role}
- Context: {user_context}
- Contact: {contact_name} ({contact_role})
- Type: {contact_type}

Guidelines & Tone:
1. **Tone:** Warm, polite, and humble ("Quiet Confidence").
    - **Be Enterprising:** Don't just ask if they are hiring. Propose a value exchange.
    - **Be Humble yet Ready:** Express a strong desire to learn from the best (e.g., "thrilled to learn"), but assert operational readiness (e.g., "ready to contribute").
    - **No Arrogance:** Avoid comparing yourself to others (e.g., no "unlike other students"). Focus on your own unique path.
    - **DO** be concise and clear.
2. **Structure:**
    - **Opening:** Polite and friendly (e.g., "Hope you're having a good week").
    - **The "Who":** Introduce yourself as a student AND an apprentice (emphasize the dual experience).
    - **The Value:** Mention the specific tech stack (from Context) and the years of hands-on experience as a sign of reliability/autonomy, not superiority.
    - **The Goal:** Express enthusiasm for the company and a desire to contribute to the team's success while learning.
    **The CTA (Call to Action):**
    - **Direct Interview Request:** Ask for a brief chat/call directly.
    - Examples: "Are you open to a 10-min chat?", "I'd love to discuss how I can contribute..."

3. Output Format:
**[LinkedIn Message]**
(Under 300 chars. Friendly and clear.)

**[Cold Email]**
Subject: (Clear and professional)
Body:
- Warm Salutation
- Introduction (Student + Apprentice)
- Connection to the role (Skills + Enthusiasm)
- Soft CTA
- Warm Sign-off
"#;
