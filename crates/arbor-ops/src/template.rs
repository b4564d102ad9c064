/// Scaffold written by the create-project operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectTemplate {
    /// Plain source folder: `src/` plus a runnable `App` class. Picked up
    /// as an invisible project on the next folder refresh.
    NoBuildTools,
    Maven,
    Gradle,
}

pub(crate) struct TemplateFile {
    pub(crate) rel_path: &'static str,
    pub(crate) contents: String,
}

const APP_JAVA: &str = "\
public class App {

    public static void main(String[] args) {
        System.out.println(\"Hello, world!\");
    }
}
";

const BUILD_GRADLE: &str = "\
plugins {
    id 'java'
}

group = 'com.example'
version = '1.0-SNAPSHOT'

repositories {
    mavenCentral()
}
";

fn pom_xml(artifact_id: &str) -> String {
    format!(
        "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<project xmlns=\"http://maven.apache.org/POM/4.0.0\"
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"
         xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd\">
    <modelVersion>4.0.0</modelVersion>
    <groupId>com.example</groupId>
    <artifactId>{artifact_id}</artifactId>
    <version>1.0-SNAPSHOT</version>
    <properties>
        <maven.compiler.source>17</maven.compiler.source>
        <maven.compiler.target>17</maven.compiler.target>
        <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>
    </properties>
</project>
"
    )
}

impl ProjectTemplate {
    /// Directories the template creates, relative to the project root.
    pub(crate) fn directories(self) -> &'static [&'static str] {
        match self {
            ProjectTemplate::NoBuildTools => &["src"],
            ProjectTemplate::Maven | ProjectTemplate::Gradle => {
                &["src/main/java", "src/test/java"]
            }
        }
    }

    /// Files the template writes, relative to the project root.
    pub(crate) fn files(self, name: &str) -> Vec<TemplateFile> {
        match self {
            ProjectTemplate::NoBuildTools => vec![
                TemplateFile {
                    rel_path: "README.md",
                    contents: format!("# {name}\n"),
                },
                TemplateFile {
                    rel_path: "src/App.java",
                    contents: APP_JAVA.to_string(),
                },
            ],
            ProjectTemplate::Maven => vec![TemplateFile {
                rel_path: "pom.xml",
                contents: pom_xml(name),
            }],
            ProjectTemplate::Gradle => vec![TemplateFile {
                rel_path: "build.gradle",
                contents: BUILD_GRADLE.to_string(),
            }],
        }
    }
}
