use snaptogether_core::GenerationMode;

/// Build the text sent upstream alongside the two photos.
///
/// `Merge` wraps the client's instruction with compositing requirements.
/// `Analysis` ignores the instruction and asks for a description of both
/// people plus a generation prompt for the given pose.
pub fn build_prompt(mode: GenerationMode, instruction: &str, pose: &str) -> String {
    match mode {
        GenerationMode::Merge => format!(
            "{instruction}

Please create a single, cohesive image that naturally merges these two people together in the specified pose: {pose}.

Important requirements:
- Make the lighting consistent between both people
- Ensure shadows and highlights match
- Create a unified background that works for both subjects
- Match skin tones and color grading
- Position the people naturally according to the {pose} pose
- Make it look like a real photograph, not a composite
- Ensure both people are clearly visible and well-composed"
        ),
        GenerationMode::Analysis => format!(
            "Analyze these two photos and describe:
1. The appearance of person in photo 1 (clothing, age, gender, ethnicity, pose)
2. The appearance of person in photo 2 (clothing, age, gender, ethnicity, pose)
3. Suggest the best background setting for a {pose} pose
4. Describe optimal lighting conditions
5. Create a detailed image generation prompt that would merge these two people in a {pose} pose

Make the description very detailed and specific for image generation."
        ),
    }
}
